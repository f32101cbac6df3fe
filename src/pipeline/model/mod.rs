//! Remote analysis model seam.
//!
//! `AnalysisModel` abstracts one prompt-in/text-out round trip; retry
//! policy wraps around it in `retry`, and the Gemini HTTP client lives in
//! `gemini`. Tests swap in `MockModel` and exercise the retry and
//! classification logic without a network.

pub mod gemini;
pub mod retry;

pub use gemini::{GeminiClient, MockModel};
pub use retry::call_with_retry;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Phrases that mark an error message as transient when no structured
/// signal is available. Lowercase; matching is case-insensitive.
const TRANSIENT_MESSAGE_MARKERS: &[&str] = &["fetch failed", "network", "connection", "timeout"];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited (HTTP 429): {message}")]
    RateLimited {
        message: String,
        /// Server-suggested wait, when the error body carried one.
        retry_after: Option<Duration>,
    },

    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("response carried no text content")]
    EmptyResponse,

    #[error("malformed response body: {0}")]
    MalformedResponse(String),
}

impl ModelError {
    /// Whether a retry has any chance of succeeding. Client-side rejections
    /// and malformed bodies fail fast; everything infrastructural retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::RateLimited { .. } | Self::Server { .. } => true,
            Self::Transport(message) => {
                let lower = message.to_lowercase();
                TRANSIENT_MESSAGE_MARKERS.iter().any(|m| lower.contains(m))
            }
            Self::Rejected { .. } | Self::EmptyResponse | Self::MalformedResponse(_) => false,
        }
    }

    /// Server-suggested backoff, if the error carried one.
    pub fn retry_delay_hint(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Parses a `retryDelay` hint like `"25s"` out of an error body and pads
/// it by one second.
pub(crate) fn parse_retry_delay(body: &str) -> Option<Duration> {
    let idx = body.find("\"retryDelay\"")?;
    let rest = &body[idx..];
    let colon = rest.find(':')?;
    let after = rest[colon + 1..].trim_start();
    let after = after.strip_prefix('"')?;
    let end = after.find('"')?;
    let raw = after[..end].trim();
    let seconds: u64 = raw.strip_suffix('s')?.trim().parse().ok()?;
    Some(Duration::from_secs(seconds + 1))
}

/// One prompt-to-text round trip against a remote analysis model.
pub trait AnalysisModel: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, ModelError>> + Send;
}
