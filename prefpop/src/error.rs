use serde_json::Value;
use thiserror::Error;

use crate::model::composition::Category;

#[derive(Error, Debug)]
pub enum PrefPopError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid upstream path: {0}")]
    InvalidPath(String),

    #[error("invalid response format: {0}")]
    UpstreamFormat(String),

    #[error("incomplete population data: missing {}", join_labels(.0))]
    IncompleteData(Vec<Category>),

    #[error("{}", describe_transport(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
        /// Decoded upstream error body, when it was JSON.
        body: Option<Value>,
    },
}

impl PrefPopError {
    pub fn transport_status(&self) -> Option<u16> {
        match self {
            PrefPopError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PrefPopError {
    fn from(err: reqwest::Error) -> Self {
        PrefPopError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            body: None,
        }
    }
}

fn join_labels(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_transport(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Error {}: {}", code, message),
        None => format!("network error: {}", message),
    }
}
