use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Default analysis backend (Google Generative Language API).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for report generation. Low temperature, JSON-mode output.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";

/// Default vision model for image OCR during extraction.
pub const DEFAULT_OCR_MODEL: &str = "gemini-2.0-flash";

/// Retry attempts after the initial call (total attempts = retries + 1).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles on each subsequent transient failure.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;

/// Report generation is a single large request; give it room.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Retry behavior for remote model calls.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Upper bound on attempts, including the first.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}

/// Configuration for the report pipeline, constructed once at process start
/// and passed by reference into the pipeline entry point.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub analysis_model: String,
    pub ocr_model: String,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }

    /// Build from environment. `GEMINI_API_KEY` is required; the rest are
    /// optional overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("GEMINI_ANALYSIS_MODEL") {
            config.analysis_model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_OCR_MODEL") {
            config.ocr_model = model;
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}
