//! Client configuration.
//!
//! A `ClientConfig` can be deserialized from JSON or read from the
//! environment. Only the base URL is required; default headers are attached
//! to every request the `ApiClient` builds.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ApiError;

/// Environment variable consulted by `ClientConfig::from_env`.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let config: ClientConfig =
            serde_json::from_str(raw).map_err(|e| ApiError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `API_BASE_URL`, falling back to `http://localhost:3000`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_env_value(std::env::var(BASE_URL_ENV).ok())
    }

    fn from_env_value(base_url: Option<String>) -> Result<Self, ApiError> {
        let config = Self::new(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.base_url.trim().is_empty() {
            return Err(ApiError::InvalidConfig("base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
