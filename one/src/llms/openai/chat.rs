//! `OpenAI` [`Provider`] implementation.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::error::{LlmError, Result};
use crate::provider::{Provider, ProviderKind};
use crate::request::GenerateRequest;
use crate::schema::JsonSchemaSpec;

use super::client::OpenAI;
use super::types::{OpenAIChatResponse, OpenAIResponseMessage};

impl OpenAI {
    /// Send one chat completion and return the first choice's message.
    #[instrument(
        name = "openai.chat",
        skip_all,
        fields(model = %request.model_or(self.model()), structured = schema.is_some())
    )]
    async fn complete(
        &self,
        request: &GenerateRequest,
        schema: Option<&JsonSchemaSpec>,
    ) -> Result<OpenAIResponseMessage> {
        let url = self.chat_url();
        let body = self.build_body(request, schema)?;

        debug!("Sending request to OpenAI API");
        let response = self
            .build_request(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from(e).with_provider("openai"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "OpenAI API returned an error");
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::from(e).with_provider("openai"))?;
        let parsed: OpenAIChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                "valid OpenAI response",
                format!("parse error: {e}, response: {response_text}"),
            )
            .with_provider("openai")
        })?;

        Self::parse_response(parsed)
    }

    /// Extract the first choice's message from a response.
    pub(crate) fn parse_response(response: OpenAIChatResponse) -> Result<OpenAIResponseMessage> {
        if let Some(usage) = response.usage {
            debug!(
                id = response.id.as_deref().unwrap_or_default(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI usage"
            );
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            LlmError::response_format("at least one choice", "empty choices")
                .with_provider("openai")
        })?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!("OpenAI response was truncated by max_tokens");
        }

        Ok(choice.message)
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let message = self.complete(request, None).await?;
        Ok(message.content.unwrap_or_default())
    }

    async fn generate_json(
        &self,
        request: &GenerateRequest,
        schema: &JsonSchemaSpec,
    ) -> Result<String> {
        let message = self.complete(request, Some(schema)).await?;

        if let Some(refusal) = message.refusal {
            return Err(LlmError::provider("openai", format!("Model refused: {refusal}")).into());
        }

        message.content.ok_or_else(|| {
            LlmError::response_format("JSON content", "empty message")
                .with_provider("openai")
                .into()
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn default_model(&self) -> &str {
        self.model()
    }
}
