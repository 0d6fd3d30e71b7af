use std::collections::{BTreeSet, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::composition::{Category, CompositionRecord, PrefCode, PrefectureRecords};

/// One year's cross-prefecture values for a single category.
///
/// `values` keeps the input prefecture order; a prefecture with no record for
/// `year` has no entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub year: i32,
    pub values: Vec<(PrefCode, f64)>,
}

impl AggregatedRow {
    pub fn get(&self, code: PrefCode) -> Option<f64> {
        self.values
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, v)| *v)
    }

    pub fn series_key(code: PrefCode) -> String {
        format!("pref_{}", code)
    }
}

// Flat, chart-ready shape: {"year": 2000, "pref_1": 100.0, ...}
impl Serialize for AggregatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.values.len()))?;
        map.serialize_entry("year", &self.year)?;
        for (code, value) in &self.values {
            map.serialize_entry(&Self::series_key(*code), value)?;
        }
        map.end()
    }
}

/// Merge per-prefecture records into one row per year, over the union of all
/// years, ascending. Pure: no gaps are zero-filled and nothing fails.
pub fn aggregate(inputs: &[PrefectureRecords], category: Category) -> Vec<AggregatedRow> {
    let years: BTreeSet<i32> = inputs
        .iter()
        .flat_map(|p| p.records.iter().map(|r| r.year))
        .collect();

    // first record wins when a prefecture repeats a year
    let by_year: Vec<(PrefCode, HashMap<i32, &CompositionRecord>)> = inputs
        .iter()
        .map(|p| {
            let mut index: HashMap<i32, &CompositionRecord> = HashMap::new();
            for r in &p.records {
                index.entry(r.year).or_insert(r);
            }
            (p.code, index)
        })
        .collect();

    years
        .into_iter()
        .map(|year| AggregatedRow {
            year,
            values: by_year
                .iter()
                .filter_map(|(code, index)| index.get(&year).map(|r| (*code, r.value(category))))
                .collect(),
        })
        .collect()
}
