use prefpop::io::fixture::{load_composition_json, load_prefectures_json};
use prefpop::io::table_export::write_table_csv;
use prefpop::model::{aggregate, build_chart, normalize, Category, PrefectureRecords};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// Usage: offline_chart [category] [prefectures.json] [code=composition.json ...]
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let category: Category = args
        .next()
        .unwrap_or_else(|| "total".to_string())
        .parse()
        .map_err(anyhow::Error::msg)?;
    let prefs_path = args
        .next()
        .unwrap_or_else(|| fixture("prefectures.json"));

    let mut inputs: Vec<(u32, String)> = Vec::new();
    for arg in args {
        let (code, path) = arg
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected code=path, got '{}'", arg))?;
        inputs.push((code.parse()?, path.to_string()));
    }
    if inputs.is_empty() {
        inputs.push((1, fixture("composition_1.json")));
        inputs.push((13, fixture("composition_13.json")));
    }

    let prefectures = load_prefectures_json(&prefs_path)?;
    let mut records = Vec::with_capacity(inputs.len());
    for (code, path) in &inputs {
        let raw = load_composition_json(path)?;
        records.push(PrefectureRecords {
            code: *code,
            records: normalize(&raw)?,
        });
    }

    let codes: Vec<u32> = inputs.iter().map(|(c, _)| *c).collect();
    let rows = aggregate(&records, category);
    write_table_csv(std::io::stdout().lock(), &rows, &codes)?;

    let chart = build_chart(&rows, &codes, &prefectures);
    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}
