//! Backend configuration loading
//!
//! The hosted backend is addressed by URL and API key, both read from the
//! environment. A `.env` file is honored when present.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{VtError, VtResult};

/// Connection settings for the hosted relational backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST endpoint
    pub url: String,

    /// API key sent as `apikey` and bearer token
    pub api_key: String,

    /// Default page size when callers do not specify one
    pub default_page_size: i64,

    /// Per-round-trip deadline in seconds
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321/rest/v1".to_string(),
            api_key: String::new(),
            default_page_size: 10,
            request_timeout_seconds: 30,
        }
    }
}

impl BackendConfig {
    /// Load configuration from the environment.
    ///
    /// `VT_BACKEND_URL` and `VT_BACKEND_KEY` are required;
    /// `VT_DEFAULT_PAGE_SIZE` and `VT_REQUEST_TIMEOUT_SECONDS` fall back to
    /// defaults when absent or unparsable.
    pub fn from_env() -> VtResult<Self> {
        // Pick up a local .env if there is one; ignore when missing.
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        config.url = std::env::var("VT_BACKEND_URL")
            .map_err(|_| VtError::Config("VT_BACKEND_URL is not set".to_string()))?;
        config.api_key = std::env::var("VT_BACKEND_KEY")
            .map_err(|_| VtError::Config("VT_BACKEND_KEY is not set".to_string()))?;

        if let Ok(size) = std::env::var("VT_DEFAULT_PAGE_SIZE") {
            match size.parse::<i64>() {
                Ok(n) if n > 0 => config.default_page_size = n,
                _ => tracing::warn!("ignoring invalid VT_DEFAULT_PAGE_SIZE={}", size),
            }
        }

        if let Ok(timeout) = std::env::var("VT_REQUEST_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(n) if n > 0 => config.request_timeout_seconds = n,
                _ => tracing::warn!("ignoring invalid VT_REQUEST_TIMEOUT_SECONDS={}", timeout),
            }
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
