use anyhow::Context;
use serde_json::Value;

use crate::io::envelope::{decode_composition, decode_prefectures};
use crate::model::composition::{Prefecture, RawLabeledSeries};

fn read_json(path: &str) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open response file: {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path))
}

/// Load a saved `/population/composition/perYear` response (envelope form).
pub fn load_composition_json(path: &str) -> anyhow::Result<RawLabeledSeries> {
    let body = read_json(path)?;
    decode_composition(body).with_context(|| format!("Bad composition response in {}", path))
}

/// Load a saved `/prefectures` response (envelope form).
pub fn load_prefectures_json(path: &str) -> anyhow::Result<Vec<Prefecture>> {
    let body = read_json(path)?;
    decode_prefectures(body).with_context(|| format!("Bad prefecture response in {}", path))
}
