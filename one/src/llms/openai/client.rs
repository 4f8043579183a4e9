//! `OpenAI` API client implementation.

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::error::{LlmError, Result};
use crate::request::GenerateRequest;
use crate::schema::JsonSchemaSpec;

use super::config::OpenAIConfig;
use super::types::{
    OpenAIChatRequest, OpenAIErrorResponse, OpenAIJsonSchema, OpenAIMessage, OpenAIResponseFormat,
};

/// `OpenAI` API client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new `OpenAI` client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the API key is empty, or an
    /// internal error if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth("openai", "API key is required").into());
        }

        let client = crate::llms::http_client(config.timeout_secs)?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client with the given API key and default settings.
    ///
    /// # Errors
    ///
    /// See [`OpenAI::new`].
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(OpenAIConfig::new(api_key))
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig::from_env()?;
        Self::new(config)
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.config.api_key
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

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build a JSON POST request with auth headers.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json");

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        req
    }

    /// Build the request body, optionally constrained to a JSON schema.
    pub(crate) fn build_body(
        &self,
        request: &GenerateRequest,
        schema: Option<&JsonSchemaSpec>,
    ) -> Result<Value> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(OpenAIMessage::system(system));
        }
        messages.push(OpenAIMessage::user(&request.prompt));

        let response_format = schema.map(|spec| OpenAIResponseFormat::JsonSchema {
            json_schema: OpenAIJsonSchema {
                name: spec.name.clone(),
                schema: if spec.is_strict() {
                    spec.strict_schema()
                } else {
                    spec.schema.clone()
                },
                strict: spec.strict,
            },
        });

        let body = OpenAIChatRequest {
            model: request.model_or(self.model()).to_owned(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stop: request.stop.clone(),
            response_format,
        };

        crate::llms::body_with_extra(&body, &request.extra)
    }

    /// Parse an error response from `OpenAI`.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;

            return match status {
                401 => LlmError::auth("openai", error.message),
                429 => LlmError::rate_limited("openai", error.message),
                _ => match error.code.or(error.error_type) {
                    Some(code) => LlmError::provider_code("openai", code, error.message),
                    None => LlmError::provider("openai", error.message),
                },
            };
        }

        LlmError::http_status(status, body.to_owned()).with_provider("openai")
    }
}
