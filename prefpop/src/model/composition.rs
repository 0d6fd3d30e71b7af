use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable numeric prefecture identifier assigned by the data source (1..=47).
pub type PrefCode = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefecture {
    #[serde(rename = "prefCode")]
    pub code: PrefCode,
    #[serde(rename = "prefName")]
    pub name: String,
}

/// One of the four fixed population composition categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Total,
    Young,
    Working,
    Elderly,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Total,
        Category::Young,
        Category::Working,
        Category::Elderly,
    ];

    /// Label used by the upstream source for this category's series.
    pub fn label(self) -> &'static str {
        match self {
            Category::Total => "総人口",
            Category::Young => "年少人口",
            Category::Working => "生産年齢人口",
            Category::Elderly => "老年人口",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Total => "total",
            Category::Young => "young",
            Category::Working => "working",
            Category::Elderly => "elderly",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "total" => Ok(Category::Total),
            "young" => Ok(Category::Young),
            "working" => Ok(Category::Working),
            "elderly" => Ok(Category::Elderly),
            other => Err(format!(
                "unknown category '{}' (expected total, young, working or elderly)",
                other
            )),
        }
    }
}

/// Population composition of one prefecture for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionRecord {
    pub year: i32,
    pub total: f64,
    pub young: f64,
    pub working: f64,
    pub elderly: f64,
}

impl CompositionRecord {
    pub fn value(&self, category: Category) -> f64 {
        match category {
            Category::Total => self.total,
            Category::Young => self.young,
            Category::Working => self.working,
            Category::Elderly => self.elderly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub year: i32,
    // null or absent upstream values count as 0
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub label: String,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

/// Composition response for one prefecture, as delivered by the source:
/// one year/value series per label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLabeledSeries {
    pub data: Vec<LabeledSeries>,
}

impl RawLabeledSeries {
    /// First series whose label matches exactly.
    pub fn series(&self, category: Category) -> Option<&LabeledSeries> {
        self.data.iter().find(|s| s.label == category.label())
    }
}

/// Normalized records of one prefecture, as fed to the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefectureRecords {
    pub code: PrefCode,
    pub records: Vec<CompositionRecord>,
}
