use prefpop::io::fixture::load_composition_json;
use prefpop::io::table_export::write_table_file;
use prefpop::model::{aggregate, normalize, Category, PrefectureRecords};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn load(code: u32, name: &str) -> PrefectureRecords {
    let raw = load_composition_json(&fixture(name)).expect("load fixture");
    PrefectureRecords {
        code,
        records: normalize(&raw).expect("normalize fixture"),
    }
}

#[test]
fn total_table_csv_snapshot() {
    let inputs = vec![load(13, "composition_13.json"), load(1, "composition_1.json")];
    let rows = aggregate(&inputs, Category::Total);

    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_table_file(tmp.path(), "total", &rows, &[13, 1]).expect("write table");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("total.csv"));

    let s = std::fs::read_to_string(path).expect("read table");
    insta::assert_snapshot!(s.trim_end(), @r"
    year,pref_13,pref_1
    2000,,5683062
    2005,12576601,5627737
    2010,13159388,5506419
    ");
}

#[test]
fn young_table_zero_fills_short_series_only_inside_a_prefecture() {
    let inputs = vec![load(1, "composition_1.json"), load(13, "composition_13.json")];
    let rows = aggregate(&inputs, Category::Young);

    let mut buf: Vec<u8> = Vec::new();
    prefpop::io::table_export::write_table_csv(&mut buf, &rows, &[1, 13]).expect("write csv");
    let s = String::from_utf8(buf).expect("utf8");
    insta::assert_snapshot!(s.trim_end(), @r"
    year,pref_1,pref_13
    2000,792352,
    2005,719057,1416739
    2010,657312,0
    ");
}

#[test]
fn missing_elderly_fixture_is_rejected() {
    let raw = load_composition_json(&fixture("composition_no_elderly.json")).expect("load fixture");
    let err = normalize(&raw).unwrap_err();
    assert_eq!(err.to_string(), "incomplete population data: missing 老年人口");
}
