use anyhow::Context;

use crate::model::aggregate::AggregatedRow;
use crate::model::composition::PrefCode;

/// Write aggregated rows as CSV: `year,pref_<code>,...` in `codes` order,
/// empty cells where a prefecture has no value for that year.
pub fn write_table_csv<W: std::io::Write>(
    out: W,
    rows: &[AggregatedRow],
    codes: &[PrefCode],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = Vec::with_capacity(codes.len() + 1);
    header.push("year".to_string());
    header.extend(codes.iter().map(|c| AggregatedRow::series_key(*c)));
    wtr.write_record(&header).context("write csv header failed")?;

    for row in rows {
        let mut record = Vec::with_capacity(codes.len() + 1);
        record.push(row.year.to_string());
        for code in codes {
            record.push(row.get(*code).map(|v| format!("{}", v)).unwrap_or_default());
        }
        wtr.write_record(&record)
            .with_context(|| format!("write csv row failed (year={})", row.year))?;
    }

    wtr.flush().context("flush csv failed")?;
    Ok(())
}

/// Write `<name>.csv` into `out_dir`, creating the directory if needed.
pub fn write_table_file(
    out_dir: impl AsRef<std::path::Path>,
    name: &str,
    rows: &[AggregatedRow],
    codes: &[PrefCode],
) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(out_dir.as_ref()).context("create output dir failed")?;
    let path = out_dir.as_ref().join(format!("{}.csv", name));
    let f = std::fs::File::create(&path)
        .with_context(|| format!("create table file failed (path={:?})", path))?;
    write_table_csv(std::io::BufWriter::new(f), rows, codes)?;
    Ok(path)
}
