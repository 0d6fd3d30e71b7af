use std::collections::HashMap;

use serde::Serialize;

use crate::model::aggregate::AggregatedRow;
use crate::model::composition::{PrefCode, Prefecture};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub pref_code: PrefCode,
    pub label: String,
    pub color: String,
    /// One point per chart label; `None` where the prefecture has no data.
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartData {
    pub labels: Vec<i32>,
    pub datasets: Vec<ChartSeries>,
}

/// Evenly spaced hue per series, in selection order.
pub fn series_color(index: usize, count: usize) -> String {
    let hue = if count == 0 { 0 } else { index * 360 / count };
    format!("hsl({}, 70%, 50%)", hue)
}

/// Line-chart input: years on the x axis, one dataset per selected prefecture.
pub fn build_chart(
    rows: &[AggregatedRow],
    selected: &[PrefCode],
    prefectures: &[Prefecture],
) -> ChartData {
    let names: HashMap<PrefCode, &str> = prefectures
        .iter()
        .map(|p| (p.code, p.name.as_str()))
        .collect();

    let datasets = selected
        .iter()
        .enumerate()
        .map(|(i, code)| ChartSeries {
            pref_code: *code,
            label: names
                .get(code)
                .map(|n| n.to_string())
                .unwrap_or_else(|| code.to_string()),
            color: series_color(i, selected.len()),
            points: rows.iter().map(|row| row.get(*code)).collect(),
        })
        .collect();

    ChartData {
        labels: rows.iter().map(|r| r.year).collect(),
        datasets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasets_follow_selection_order_with_gaps() {
        let rows = vec![
            AggregatedRow {
                year: 2000,
                values: vec![(1, 100.0)],
            },
            AggregatedRow {
                year: 2005,
                values: vec![(1, 110.0), (2, 90.0)],
            },
        ];
        let prefectures = vec![
            Prefecture {
                code: 1,
                name: "北海道".to_string(),
            },
            Prefecture {
                code: 2,
                name: "青森県".to_string(),
            },
        ];

        let chart = build_chart(&rows, &[2, 1], &prefectures);
        assert_eq!(chart.labels, vec![2000, 2005]);
        assert_eq!(chart.datasets[0].label, "青森県");
        assert_eq!(chart.datasets[0].points, vec![None, Some(90.0)]);
        assert_eq!(chart.datasets[0].color, "hsl(0, 70%, 50%)");
        assert_eq!(chart.datasets[1].label, "北海道");
        assert_eq!(chart.datasets[1].color, "hsl(180, 70%, 50%)");
    }

    #[test]
    fn unknown_prefecture_is_labelled_by_code() {
        let chart = build_chart(&[], &[47], &[]);
        assert_eq!(chart.datasets[0].label, "47");
        assert!(chart.datasets[0].points.is_empty());
    }
}
