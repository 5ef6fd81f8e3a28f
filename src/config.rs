use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::markers::query::StaleResponsePolicy;
use crate::refresh::refresh::DEFAULT_REFRESH_PERIOD;

pub const ENV_BASE_URL: &str = "DOC_GLOBE_BASE_URL";
pub const ENV_REFRESH_MS: &str = "DOC_GLOBE_REFRESH_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("refresh interval must be greater than zero")]
    InvalidInterval,
    #[error("{var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub base_url: String,
    pub doc_points_path: String,
    pub query_point_path: String,
    pub refresh_interval_ms: u64,
    pub cache_bust_documents: bool,
    pub stale_responses: StaleResponsePolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            base_url: "http://127.0.0.1:8000/static/searchapp/json_files/".into(),
            doc_points_path: "doc_points.json".into(),
            query_point_path: "query_point.json".into(),
            refresh_interval_ms: DEFAULT_REFRESH_PERIOD.as_millis() as u64,
            cache_bust_documents: true,
            stale_responses: StaleResponsePolicy::Apply,
        }
    }
}

impl ViewerConfig {
    /// Reads the JSON config at `path` (defaults when `None`), applies
    /// environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => serde_json::from_slice(&fs::read(path)?)?,
            None => ViewerConfig::default(),
        };
        let config = config.with_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_REFRESH_MS) {
            self.refresh_interval_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_REFRESH_MS,
                value: raw.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
