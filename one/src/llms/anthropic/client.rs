//! Anthropic API client implementation.

use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::{LlmError, Result};
use crate::request::GenerateRequest;

use super::config::AnthropicConfig;
use super::types::{AnthropicErrorResponse, AnthropicMessage, AnthropicMessagesRequest};

/// Anthropic API client.
#[derive(Clone)]
pub struct Anthropic {
    pub(crate) config: Arc<AnthropicConfig>,
    pub(crate) client: Client,
    headers: HeaderMap,
}

impl Anthropic {
    /// Create a new Anthropic client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the API key is empty or not a valid
    /// header value, or an internal error if the HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("anthropic", "API key is required").into());
        }

        let headers = Self::auth_headers(&config)?;
        let client = crate::llms::http_client(config.timeout_secs)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            headers,
        })
    }

    /// Create a client with the given API key and default settings.
    ///
    /// # Errors
    ///
    /// See [`Anthropic::new`].
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(AnthropicConfig::new(api_key))
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `ANTHROPIC_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let config = AnthropicConfig::from_env()?;
        Self::new(config)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the messages URL.
    pub(crate) fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// Build a JSON POST request with auth headers.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url).headers(self.headers.clone())
    }

    fn auth_headers(config: &AnthropicConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| LlmError::auth("anthropic", "API key is not a valid header value"))?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);

        let version = HeaderValue::from_str(&config.version).map_err(|_| {
            LlmError::internal(format!("Invalid anthropic-version: {}", config.version))
        })?;
        headers.insert("anthropic-version", version);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    /// Build the request body with the given system prompt.
    pub(crate) fn build_body(
        &self,
        request: &GenerateRequest,
        system: Option<String>,
    ) -> Result<Value> {
        let body = AnthropicMessagesRequest {
            model: request.model_or(self.model()).to_owned(),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature,
            system,
            messages: vec![AnthropicMessage::user(&request.prompt)],
            top_p: request.top_p,
            stop_sequences: request.stop.clone().filter(|stop| !stop.is_empty()),
        };

        crate::llms::body_with_extra(&body, &request.extra)
    }

    /// Parse an error response from Anthropic.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(body) {
            let error = error_response.error;

            return match status {
                401 | 403 => LlmError::auth("anthropic", error.message),
                429 => LlmError::rate_limited("anthropic", error.message),
                _ => LlmError::provider_code("anthropic", error.error_type, error.message),
            };
        }

        LlmError::http_status(status, body.to_owned()).with_provider("anthropic")
    }
}

impl std::fmt::Debug for Anthropic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anthropic")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::{Error, LlmErrorKind};
    use serde_json::json;

    fn client() -> Anthropic {
        Anthropic::with_api_key("test-key").unwrap()
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = Anthropic::new(AnthropicConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Llm(ref e) if e.kind == LlmErrorKind::Auth));
    }

    #[test]
    fn invalid_header_key_is_rejected() {
        let err = Anthropic::with_api_key("bad\nkey").unwrap_err();
        assert!(matches!(err, Error::Llm(ref e) if e.kind == LlmErrorKind::Auth));
    }

    #[test]
    fn headers_carry_key_and_version() {
        let client = client();
        assert_eq!(client.headers["x-api-key"], "test-key");
        assert_eq!(client.headers["anthropic-version"], "2023-06-01");
        assert_eq!(client.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = Anthropic::with_api_key("sk-ant-SECRET123").unwrap();
        assert!(client.headers["x-api-key"].is_sensitive());

        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-ant-SECRET123"));
        assert!(!format!("{:?}", client.headers).contains("sk-ant-SECRET123"));
    }

    #[test]
    fn messages_url_joins_base() {
        let client =
            Anthropic::new(AnthropicConfig::new("k").with_base_url("http://localhost:9/")).unwrap();
        assert_eq!(client.messages_url(), "http://localhost:9/v1/messages");
    }

    #[test]
    fn body_uses_defaults() {
        let body = client()
            .build_body(&GenerateRequest::new("What is the capital of France?"), None)
            .unwrap();

        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["temperature"], json!(0.7_f32));
        assert_eq!(
            body["messages"],
            json!([{ "role": "user", "content": "What is the capital of France?" }])
        );
        assert!(body.get("system").is_none());
    }

    #[test]
    fn body_custom_params() {
        let request = GenerateRequest::new("Test prompt")
            .model("claude-3-opus-20240229")
            .temperature(0.5)
            .max_tokens(200)
            .stop(vec!["\n\nHuman:".into()])
            .param("top_k", 5);
        let body = client()
            .build_body(&request, Some("Be brief.".to_owned()))
            .unwrap();

        assert_eq!(body["model"], "claude-3-opus-20240229");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["temperature"], json!(0.5_f32));
        assert_eq!(body["system"], "Be brief.");
        assert_eq!(body["stop_sequences"], json!(["\n\nHuman:"]));
        assert_eq!(body["top_k"], 5);
    }

    #[test]
    fn empty_stop_is_omitted() {
        let request = GenerateRequest::new("x").stop(Vec::new());
        let body = client().build_body(&request, None).unwrap();
        assert!(body.get("stop_sequences").is_none());
    }

    #[test]
    fn parse_error_maps_status() {
        let body = |error_type: &str, message: &str| {
            json!({ "type": "error", "error": { "type": error_type, "message": message } })
                .to_string()
        };

        let auth = body("authentication_error", "invalid x-api-key");
        assert_eq!(Anthropic::parse_error(401, &auth).kind, LlmErrorKind::Auth);

        let limited = body("rate_limit_error", "Slow down");
        assert_eq!(Anthropic::parse_error(429, &limited).kind, LlmErrorKind::RateLimited);

        let overloaded = body("overloaded_error", "Overloaded");
        let err = Anthropic::parse_error(529, &overloaded);
        assert_eq!(err.kind, LlmErrorKind::Provider);
        assert_eq!(err.code.as_deref(), Some("overloaded_error"));
    }

    #[test]
    fn parse_error_falls_back_to_status() {
        let err = Anthropic::parse_error(500, "");
        assert_eq!(err.kind, LlmErrorKind::HttpStatus);
        assert_eq!(err.provider.as_deref(), Some("anthropic"));
    }
}
