use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::response::candidate_text;
use super::types::{ApiError, GenerateContentRequest, GenerateContentResponse};
use crate::llm::{GenerationError, StructuredGenerator, TextGenerator, retry_transient};

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// One attempt: upstream failures surface to the caller unless retries are configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Gemini `generateContent` client. Serves grounded research (Google Search tool)
/// and schema-constrained JSON extraction from the same endpoint.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    max_attempts: u32,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: &str, model: &str) -> Self {
        Self {
            http,
            api_key: ApiKey(api_key.to_string()),
            model: model.to_string(),
            base_url: API_BASE.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Total attempts per call; 429 and 5xx responses are retried with jittered backoff.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limited");
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<GenerateContentResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(err);
                warn!(error = %classified, "Gemini API error");
                return Err(classified);
            }
            let snippet: String = text.chars().take(200).collect();
            warn!(status = %status, "Gemini API error (no structured body)");
            return Err(GenerationError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {snippet}"),
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        if let Some(err) = &body.error {
            let classified = classify_api_error(err);
            warn!(error = %classified, "Gemini API error in 200 response");
            return Err(classified);
        }

        Ok(body)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateContentRequest::grounded(prompt);
        let response = retry_transient(self.max_attempts, || self.generate(&request)).await?;
        let answer = candidate_text(&response).ok_or(GenerationError::EmptyResponse)?;
        debug!(model = %self.model, bytes = answer.len(), "gemini grounded generation complete");
        Ok(answer)
    }
}

impl StructuredGenerator for GeminiClient {
    async fn generate_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError> {
        let request = GenerateContentRequest::structured(prompt, schema.clone());
        let response = retry_transient(self.max_attempts, || self.generate(&request)).await?;
        let text = candidate_text(&response).ok_or(GenerationError::EmptyResponse)?;
        debug!(model = %self.model, bytes = text.len(), "gemini structured generation complete");
        serde_json::from_str(&text).map_err(|e| GenerationError::MalformedOutput(e.to_string()))
    }
}

fn classify_api_error(err: &ApiError) -> GenerationError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code {
        Some(429) => GenerationError::RateLimited,
        Some(403) => GenerationError::QuotaExhausted(message),
        Some(code) => GenerationError::Api { code, message },
        None => GenerationError::Api {
            code: 0,
            message: format!("Unknown error (no status code): {message}"),
        },
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_response(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": text}],
                    "role": "model"
                }
            }]
        })
    }

    #[tokio::test]
    async fn generate_text_sends_search_tool_and_returns_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({"tools": [{"google_search": {}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Top five list")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let answer = client.generate_text("list universities").await.unwrap();

        assert_eq!(answer, "Top five list");
    }

    #[tokio::test]
    async fn generate_text_empty_candidate_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_text("q").await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn generate_json_sends_schema_and_decodes_output() {
        let server = MockServer::start().await;
        let schema = json!({"type": "ARRAY", "items": {"type": "OBJECT"}});
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": schema.clone()
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response(r#"[{"name":"Alpha U","rank":1}]"#)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let value = client.generate_json("extract", &schema).await.unwrap();

        assert_eq!(value[0]["name"], "Alpha U");
        assert_eq!(value[0]["rank"], 1);
    }

    #[tokio::test]
    async fn generate_json_non_json_text_is_malformed_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("not json")))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_json("extract", &json!({})).await;
        assert!(matches!(result, Err(GenerationError::MalformedOutput(_))));
    }

    #[tokio::test]
    async fn generate_429_returns_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_text("test").await;
        assert!(matches!(result, Err(GenerationError::RateLimited)));
    }

    #[tokio::test]
    async fn server_error_is_not_retried_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_text("test").await;
        assert!(matches!(result, Err(GenerationError::Api { code: 503, .. })));
    }

    #[tokio::test]
    async fn transient_failure_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("recovered")))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri()).with_max_attempts(2);
        let answer = client.generate_text("test").await.unwrap();
        assert_eq!(answer, "recovered");
    }

    #[tokio::test]
    async fn generate_500_with_error_body_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {
                    "code": 500,
                    "message": "Internal server error"
                }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_text("test").await;
        match &result {
            Err(GenerationError::Api { code: 500, message }) => {
                assert!(message.contains("Internal server error"));
            }
            other => panic!("expected Api(500) with body message, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_500_with_invalid_body_returns_generic_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(500).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_text("test").await;
        match &result {
            Err(GenerationError::Api { code: 500, message }) => {
                assert!(message.contains("not json"), "got: {message}");
            }
            other => panic!("expected Api(500) without body, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_200_with_error_field_returns_classified_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "Quota exceeded"
                }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(Client::new(), &server.uri());
        let result = client.generate_text("test").await;
        assert!(matches!(result, Err(GenerationError::QuotaExhausted(_))));
    }
}
