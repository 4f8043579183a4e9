//! Anthropic [`Provider`] implementation.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::error::{LlmError, Result};
use crate::provider::{Provider, ProviderKind};
use crate::request::GenerateRequest;
use crate::schema::JsonSchemaSpec;

use super::client::Anthropic;
use super::types::AnthropicMessagesResponse;

/// Builds the system prompt for a schema-constrained call.
///
/// A caller-supplied system prompt comes first, separated from the schema
/// instruction by a blank line.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the schema cannot be
/// pretty-printed.
pub fn schema_system_prompt(system: Option<&str>, schema: &JsonSchemaSpec) -> Result<String> {
    let instruction = schema.to_prompt()?;
    Ok(match system.map(str::trim).filter(|s| !s.is_empty()) {
        Some(system) => format!("{system}\n\n{instruction}"),
        None => instruction,
    })
}

impl Anthropic {
    /// Send one Messages API call.
    #[instrument(
        name = "anthropic.messages",
        skip_all,
        fields(model = %request.model_or(self.model()), structured = system.is_some())
    )]
    async fn send(
        &self,
        request: &GenerateRequest,
        system: Option<String>,
    ) -> Result<AnthropicMessagesResponse> {
        let url = self.messages_url();
        let body = self.build_body(request, system)?;

        debug!("Sending request to Anthropic API");
        let response = self
            .build_request(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from(e).with_provider("anthropic"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Anthropic API returned an error");
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::from(e).with_provider("anthropic"))?;
        let parsed: AnthropicMessagesResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                LlmError::response_format(
                    "valid Anthropic response",
                    format!("parse error: {e}, response: {response_text}"),
                )
                .with_provider("anthropic")
            })?;

        if let Some(usage) = parsed.usage {
            debug!(
                id = parsed.id.as_deref().unwrap_or_default(),
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic usage"
            );
        }
        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Anthropic response was truncated by max_tokens");
        }

        Ok(parsed)
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let response = self.send(request, request.system.clone()).await?;
        Ok(response.first_text().unwrap_or_default().to_owned())
    }

    async fn generate_json(
        &self,
        request: &GenerateRequest,
        schema: &JsonSchemaSpec,
    ) -> Result<String> {
        let system = schema_system_prompt(request.system.as_deref(), schema)?;
        let response = self.send(request, Some(system)).await?;

        response.first_text().map(str::to_owned).ok_or_else(|| {
            LlmError::response_format("a text content block", "no text in response")
                .with_provider("anthropic")
                .into()
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn default_model(&self) -> &str {
        self.model()
    }
}
