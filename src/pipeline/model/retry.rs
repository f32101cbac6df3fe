//! Exponential-backoff retry around one model call.

use tracing::{info, warn};

use crate::config::RetryPolicy;

use super::{AnalysisModel, ModelError};

/// Calls the model, retrying transient failures up to the policy's limit
/// with doubling delays. Non-transient failures return immediately; a
/// server-suggested wait overrides the computed backoff for that attempt.
pub async fn call_with_retry<M: AnalysisModel>(
    model: &M,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, ModelError> {
    let mut delay = policy.initial_backoff();
    let mut last_error = None;

    for attempt in 1..=policy.total_attempts() {
        match model.generate(prompt).await {
            Ok(text) => {
                if attempt > 1 {
                    info!(attempt, "model call succeeded after retry");
                }
                return Ok(text);
            }
            Err(err) if err.is_transient() && attempt < policy.total_attempts() => {
                let wait = err.retry_delay_hint().unwrap_or(delay);
                warn!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "transient model failure; backing off"
                );
                tokio::time::sleep(wait).await;
                delay = delay.saturating_mul(2);
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    // Unreachable while total_attempts() >= 1; the loop always returns.
    Err(last_error.unwrap_or(ModelError::Timeout))
}
