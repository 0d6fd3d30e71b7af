use url::Url;

use crate::error::PrefPopError;

pub const DEFAULT_BASE_URL: &str = "https://opendata.resas-portal.go.jp/api/v1";

/// Credentials and endpoint for the upstream population API.
#[derive(Clone)]
pub struct ResasConfig {
    pub api_key: String,
    pub base_url: Url,
}

impl std::fmt::Debug for ResasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResasConfig")
            .field("api_key", &redact_key(&self.api_key))
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ResasConfig {
    /// `RESAS_API_KEY` (required) and `RESAS_API_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, PrefPopError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PrefPopError> {
        let api_key = match lookup("RESAS_API_KEY") {
            Some(key) if valid_api_key(&key) => key.trim().to_string(),
            _ => {
                return Err(PrefPopError::Configuration(
                    "RESAS_API_KEY is not defined".to_string(),
                ))
            }
        };
        let raw = lookup("RESAS_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, &raw)
    }

    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, PrefPopError> {
        let api_key = api_key.into();
        if !valid_api_key(&api_key) {
            return Err(PrefPopError::Configuration("empty API key".to_string()));
        }
        let base_url = Url::parse(base_url.trim()).map_err(|e| {
            PrefPopError::Configuration(format!("invalid base url '{}': {}", base_url, e))
        })?;
        Ok(Self { api_key, base_url })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(8000);
        Self { host, port }
    }
}

fn valid_api_key(key: &str) -> bool {
    let trimmed = key.trim();
    !trimmed.is_empty() && !trimmed.contains("...")
}

/// Keep the first four characters for log correlation, mask the rest.
pub fn redact_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}
