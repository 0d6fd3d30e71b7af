use crate::error::PrefPopError;
use crate::model::composition::{Category, CompositionRecord, DataPoint, RawLabeledSeries};

/// Convert one prefecture's labeled series into per-year composition records.
///
/// The `総人口` series defines the year axis. The other three categories are
/// aligned to it by position, not by year; a point missing at some index (or
/// carrying no value) contributes 0. All four labels must be present.
///
/// Output is ascending by year with one record per year. Negative values are
/// clamped to 0.
pub fn normalize(raw: &RawLabeledSeries) -> Result<Vec<CompositionRecord>, PrefPopError> {
    let missing: Vec<Category> = Category::ALL
        .iter()
        .copied()
        .filter(|c| raw.series(*c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(PrefPopError::IncompleteData(missing));
    }

    let total = series_points(raw, Category::Total);
    let young = series_points(raw, Category::Young);
    let working = series_points(raw, Category::Working);
    let elderly = series_points(raw, Category::Elderly);

    let mut records: Vec<CompositionRecord> = total
        .iter()
        .enumerate()
        .map(|(i, point)| CompositionRecord {
            year: point.year,
            total: clean(point.value),
            young: value_at(young, i),
            working: value_at(working, i),
            elderly: value_at(elderly, i),
        })
        .collect();

    // Upstream sends ascending years; only reorder if it did not.
    if !records.windows(2).all(|w| w[0].year < w[1].year) {
        records.sort_by_key(|r| r.year);
        records.dedup_by_key(|r| r.year);
    }

    Ok(records)
}

fn series_points(raw: &RawLabeledSeries, category: Category) -> &[DataPoint] {
    raw.series(category).map(|s| s.data.as_slice()).unwrap_or(&[])
}

fn value_at(points: &[DataPoint], index: usize) -> f64 {
    clean(points.get(index).and_then(|p| p.value))
}

fn clean(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.max(0.0),
        _ => 0.0,
    }
}
