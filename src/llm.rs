//! Generation capabilities shared by the research pipeline and its model backends.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0} not set")]
    ApiKeyNotSet(&'static str),

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("model returned an empty response (safety filter or empty candidate)")]
    EmptyResponse,

    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(String),
}

impl GenerationError {
    /// Rate limits and server-side failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited
                | GenerationError::Api {
                    code: 500..=599,
                    ..
                }
        )
    }
}

/// Free-text generation grounded in live web search.
/// Implemented by `GeminiClient` and `PerplexityClient`; mock implementations used in tests.
pub trait TextGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generation constrained to a JSON schema. The returned value is decoded JSON
/// that still has to be validated by the caller.
pub trait StructuredGenerator {
    async fn generate_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError>;
}

/// Runs `op` up to `max_attempts` times, sleeping between transient failures.
pub(crate) async fn retry_transient<T, F, Fut>(
    max_attempts: u32,
    mut op: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                let delay_ms = jittered_backoff(attempt);
                debug!(
                    attempt = attempt + 1,
                    delay_ms,
                    error = %e,
                    "retrying after transient error"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

/// Pulls a human-readable message out of an error body, falling back to a snippet.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["error"]["message"]
                .as_str()
                .or_else(|| v["message"].as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
