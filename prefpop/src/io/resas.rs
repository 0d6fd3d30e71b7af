use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{redact_key, ResasConfig};
use crate::error::PrefPopError;
use crate::io::envelope::{decode_composition, decode_prefectures};
use crate::model::composition::{CompositionRecord, PrefCode, Prefecture, RawLabeledSeries};
use crate::model::normalize::normalize;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Anything that can serve the prefecture list and raw composition series.
#[async_trait]
pub trait PopulationSource: Send + Sync {
    async fn prefectures(&self) -> Result<Vec<Prefecture>, PrefPopError>;

    async fn raw_composition(&self, pref_code: PrefCode) -> Result<RawLabeledSeries, PrefPopError>;

    /// Raw series normalized into per-year records.
    async fn composition(&self, pref_code: PrefCode) -> Result<Vec<CompositionRecord>, PrefPopError> {
        let raw = self.raw_composition(pref_code).await?;
        normalize(&raw).map_err(|e| {
            warn!(pref_code, error = %e, "composition rejected");
            e
        })
    }
}

/// HTTP client for the RESAS open-data API.
pub struct ResasClient {
    http: Client,
    base_url: Url,
}

impl ResasClient {
    pub fn new(config: &ResasConfig) -> Result<Self, PrefPopError> {
        let mut key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            PrefPopError::Configuration("API key is not a valid header value".to_string())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(concat!("prefpop/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| PrefPopError::Configuration(format!("http client: {}", e)))?;

        debug!(
            base_url = %config.base_url,
            api_key = %redact_key(&config.api_key),
            "resas client ready"
        );
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// `{base}/{path}` with the query string attached verbatim. Paths with
    /// dot segments are refused so a request cannot leave the base path.
    pub fn endpoint(&self, path: &str, raw_query: Option<&str>) -> Result<Url, PrefPopError> {
        if path.split(['/', '\\']).any(is_dot_segment) {
            return Err(PrefPopError::InvalidPath(path.to_string()));
        }
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| PrefPopError::InvalidPath(format!("'{}': {}", joined, e)))?;
        url.set_query(raw_query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    /// GET `path` and return a successful response untouched. Non-2xx answers
    /// become `Transport` errors carrying the upstream status and JSON body.
    pub async fn get_raw(
        &self,
        path: &str,
        raw_query: Option<&str>,
    ) -> Result<UpstreamResponse, PrefPopError> {
        let url = self.endpoint(path, raw_query)?;
        debug!(%url, "upstream request");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();
            let message = parsed
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            warn!(path, status = status.as_u16(), %message, "upstream error");
            return Err(PrefPopError::Transport {
                status: Some(status.as_u16()),
                message,
                body: parsed,
            });
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body: bytes.to_vec(),
        })
    }

    async fn get_json(&self, path: &str, raw_query: Option<&str>) -> Result<Value, PrefPopError> {
        let resp = self.get_raw(path, raw_query).await?;
        serde_json::from_slice(&resp.body)
            .map_err(|e| PrefPopError::UpstreamFormat(format!("{}: body is not JSON: {}", path, e)))
    }
}

/// A 2xx upstream answer, body bytes as received.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
    )
}

#[async_trait]
impl PopulationSource for ResasClient {
    async fn prefectures(&self) -> Result<Vec<Prefecture>, PrefPopError> {
        let body = self.get_json("prefectures", None).await?;
        let prefectures = decode_prefectures(body)?;
        debug!(count = prefectures.len(), "prefectures fetched");
        Ok(prefectures)
    }

    async fn raw_composition(&self, pref_code: PrefCode) -> Result<RawLabeledSeries, PrefPopError> {
        let query = format!("prefCode={}&cityCode=-", pref_code);
        let body = self
            .get_json("population/composition/perYear", Some(&query))
            .await?;
        decode_composition(body)
    }
}
