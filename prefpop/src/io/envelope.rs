use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PrefPopError;
use crate::model::composition::{Prefecture, RawLabeledSeries};

/// Common `{ message, result }` wrapper of every upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub result: T,
}

/// Decode the envelope and return its `result`, or `UpstreamFormat` naming
/// `what` was being decoded.
pub fn decode_result<T: DeserializeOwned>(body: Value, what: &str) -> Result<T, PrefPopError> {
    if !body.is_object() {
        return Err(PrefPopError::UpstreamFormat(format!(
            "{}: expected a JSON object",
            what
        )));
    }
    let envelope: ApiEnvelope<T> = serde_json::from_value(body)
        .map_err(|e| PrefPopError::UpstreamFormat(format!("{}: {}", what, e)))?;
    Ok(envelope.result)
}

pub fn decode_prefectures(body: Value) -> Result<Vec<Prefecture>, PrefPopError> {
    let prefectures: Vec<Prefecture> = decode_result(body, "prefectures")?;
    if prefectures.is_empty() {
        return Err(PrefPopError::UpstreamFormat(
            "prefectures: empty result".to_string(),
        ));
    }
    Ok(prefectures)
}

pub fn decode_composition(body: Value) -> Result<RawLabeledSeries, PrefPopError> {
    decode_result(body, "population composition")
}
