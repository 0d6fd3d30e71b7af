use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::PrefPopError;
use crate::io::resas::ResasClient;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Status, content type and body to hand back to the caller of the
/// forwarding route.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ProxyReply {
    /// Normalized failure body: `{ message, statusCode, errorData }`.
    pub fn from_error(err: &PrefPopError) -> Self {
        let status = match err {
            PrefPopError::InvalidPath(_) => 400,
            _ => err.transport_status().unwrap_or(500),
        };
        let error_data = match err {
            PrefPopError::Transport { body, .. } => body.clone().unwrap_or(Value::Null),
            _ => Value::Null,
        };
        let body = json!({
            "message": err.to_string(),
            "statusCode": status,
            "errorData": error_data,
        });
        Self {
            status,
            content_type: JSON_CONTENT_TYPE.to_string(),
            body: body.to_string().into_bytes(),
        }
    }

    /// Body decoded as JSON, when it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Forward `GET {base}/{path}?{raw_query}` upstream with the injected API key.
/// Successful bodies are passed through byte for byte.
pub async fn forward(client: &ResasClient, path: &str, raw_query: Option<&str>) -> ProxyReply {
    info!(path, query = raw_query.unwrap_or(""), "proxy request");
    match client.get_raw(path, raw_query).await {
        Ok(resp) => {
            info!(path, status = resp.status, bytes = resp.body.len(), "proxy response");
            ProxyReply {
                status: resp.status,
                content_type: resp
                    .content_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                body: resp.body,
            }
        }
        Err(e) => {
            warn!(path, error = %e, "proxy request failed");
            ProxyReply::from_error(&e)
        }
    }
}
