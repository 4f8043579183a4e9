//! The unified model facade.
//!
//! [`Model`] hides which vendor serves a model. Pick a model by name and the
//! provider follows from its prefix; generation calls then look the same
//! for every backend.
//!
//! ```rust,ignore
//! use one::{JsonSchema, Model};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Capital { city: String, country: String }
//!
//! let model = Model::new("claude-3-5-sonnet-20241022")?;
//! let text = model.generate("What is the capital of France?").await?;
//! let capital: Capital = model.generate_structured("Capital of France?").await?;
//! ```

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::llms::{Anthropic, AnthropicConfig, OpenAI, OpenAIConfig};
use crate::provider::{ProviderKind, SharedProvider, detect_provider};
use crate::request::GenerateRequest;
use crate::schema::{JsonSchemaSpec, parse_structured};

/// A model bound to the provider that serves it.
#[derive(Clone)]
pub struct Model {
    provider: SharedProvider,
    model: String,
}

impl Model {
    /// Creates a model, detecting its provider from the name.
    ///
    /// The provider's API key is read from the environment, after loading a
    /// `.env` file when the `dotenv` feature is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModel`](crate::Error::UnknownModel) if no
    /// provider serves `model`, or an authentication error if the provider's
    /// API key is not set.
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let kind = detect_provider(&model)?;
        crate::load_dotenv();
        let provider = build_provider(kind, None)?;
        Ok(Self::from_provider(provider, model))
    }

    /// Creates a model with an explicit API key.
    ///
    /// # Errors
    ///
    /// See [`Model::new`].
    pub fn with_api_key(model: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let kind = detect_provider(&model)?;
        let provider = build_provider(kind, Some(api_key.into()))?;
        Ok(Self::from_provider(provider, model))
    }

    /// Creates the default model of an explicitly chosen provider.
    ///
    /// The model is the backend's configured default, so `OPENAI_MODEL` or
    /// `ANTHROPIC_MODEL` override it. Use `"anthropic".parse()?` to select a
    /// provider by name.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the provider's API key is not set.
    pub fn for_provider(kind: ProviderKind) -> Result<Self> {
        crate::load_dotenv();
        Ok(Self::with_default_model(build_provider(kind, None)?))
    }

    /// Creates the default model of a provider with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `api_key` is empty.
    pub fn for_provider_with_key(kind: ProviderKind, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_default_model(build_provider(kind, Some(api_key.into()))?))
    }

    /// Wraps an already built provider.
    #[must_use]
    pub fn from_provider(provider: SharedProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn with_default_model(provider: SharedProvider) -> Self {
        let model = provider.default_model().to_owned();
        Self::from_provider(provider, model)
    }

    /// Which vendor serves this model.
    #[must_use]
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// The model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The underlying provider.
    #[must_use]
    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// Generates text for a prompt with default parameters.
    ///
    /// # Errors
    ///
    /// Propagates whatever the provider reports.
    pub async fn generate(&self, prompt: impl Into<String>) -> Result<String> {
        self.generate_with(GenerateRequest::new(prompt)).await
    }

    /// Generates text for a fully specified request.
    ///
    /// The request's model wins over this model's name when both are set.
    ///
    /// # Errors
    ///
    /// Propagates whatever the provider reports.
    #[instrument(skip_all, fields(provider = %self.provider_kind(), model = %self.model))]
    pub async fn generate_with(&self, request: GenerateRequest) -> Result<String> {
        let request = self.bind(request);
        debug!("Generating text");
        self.provider.generate(&request).await
    }

    /// Generates a value of type `T` for a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the output
    /// does not match `T`'s schema, otherwise propagates provider errors.
    pub async fn generate_structured<T>(&self, prompt: impl Into<String>) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        self.generate_structured_with(GenerateRequest::new(prompt))
            .await
    }

    /// Generates a value of type `T` for a fully specified request.
    ///
    /// # Errors
    ///
    /// See [`Model::generate_structured`].
    #[instrument(
        skip_all,
        fields(
            provider = %self.provider_kind(),
            model = %self.model,
            schema = tracing::field::Empty
        )
    )]
    pub async fn generate_structured_with<T>(&self, request: GenerateRequest) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let spec = JsonSchemaSpec::from_type::<T>();
        tracing::Span::current().record("schema", spec.name.as_str());

        let request = self.bind(request);
        debug!("Generating structured output");
        let text = self.provider.generate_json(&request, &spec).await?;
        parse_structured(&text, &spec)
    }

    fn bind(&self, mut request: GenerateRequest) -> GenerateRequest {
        if request.model.is_none() {
            request.model = Some(self.model.clone());
        }
        request
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("provider", &self.provider_kind())
            .field("model", &self.model)
            .finish()
    }
}

fn build_provider(kind: ProviderKind, api_key: Option<String>) -> Result<SharedProvider> {
    let provider: SharedProvider = match (kind, api_key) {
        (ProviderKind::OpenAI, Some(key)) => Arc::new(OpenAI::new(OpenAIConfig::new(key))?),
        (ProviderKind::OpenAI, None) => Arc::new(OpenAI::from_env()?),
        (ProviderKind::Anthropic, Some(key)) => {
            Arc::new(Anthropic::new(AnthropicConfig::new(key))?)
        }
        (ProviderKind::Anthropic, None) => Arc::new(Anthropic::from_env()?),
    };
    Ok(provider)
}
