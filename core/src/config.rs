//! Client configuration.
//!
//! Holds the base URL and API key. Values are fixed once a client has been
//! built from them.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Public endpoint of the dog catalog service.
pub const DEFAULT_BASE_URL: &str = "https://api.thedogapi.com/v1/";

/// Connection settings for `DogClient` / `DogApi`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are resolved against.
    pub base_url: String,
    /// Sent as `x-api-key` on every request. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: String,
}

// Keeps the key out of logs and panic messages.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// - `DOG_API_KEY`: API key (required)
    /// - `DOG_API_URL`: base URL (optional, defaults to [`DEFAULT_BASE_URL`])
    pub fn from_env() -> ApiResult<Self> {
        let api_key =
            env::var("DOG_API_KEY").map_err(|_| ApiError::Config("DOG_API_KEY is not set".to_string()))?;
        let base_url = env::var("DOG_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let config = Self { base_url, api_key };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::Config("api_key cannot be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::Config(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
        Ok(())
    }
}
