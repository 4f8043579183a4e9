//! Provider detection and the provider abstraction.
//!
//! A model name decides which vendor serves it:
//!
//! | prefix                        | provider    |
//! |-------------------------------|-------------|
//! | `gpt-`, `o1-`, `text-`        | `OpenAI`    |
//! | `claude-`                     | Anthropic   |
//!
//! Every backend implements [`Provider`], so the [`Model`](crate::Model)
//! facade can hold either one behind a trait object.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::GenerateRequest;
use crate::schema::JsonSchemaSpec;

/// Model name prefixes served by `OpenAI`.
pub const OPENAI_PREFIXES: &[&str] = &["gpt-", "o1-", "text-"];

/// Model name prefixes served by Anthropic.
pub const ANTHROPIC_PREFIXES: &[&str] = &["claude-"];

/// The supported LLM vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `OpenAI` Chat Completions API.
    OpenAI,
    /// Anthropic Messages API.
    Anthropic,
}

impl ProviderKind {
    /// All supported providers.
    pub const ALL: [Self; 2] = [Self::OpenAI, Self::Anthropic];

    /// Returns the lowercase provider name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Returns the model used when the caller does not name one.
    #[must_use]
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => crate::llms::openai::DEFAULT_MODEL,
            Self::Anthropic => crate::llms::anthropic::DEFAULT_MODEL,
        }
    }

    /// Returns the environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Returns the model name prefixes routed to this provider.
    #[must_use]
    pub const fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => OPENAI_PREFIXES,
            Self::Anthropic => ANTHROPIC_PREFIXES,
        }
    }

    /// Returns `true` if `model` belongs to this provider.
    #[must_use]
    pub fn matches(&self, model: &str) -> bool {
        self.prefixes().iter().any(|prefix| model.starts_with(prefix))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(Error::unknown_provider(s)),
        }
    }
}

/// Detect the provider serving `model` from its name prefix.
///
/// # Errors
///
/// Returns [`Error::UnknownModel`] when no known prefix matches.
pub fn detect_provider(model: &str) -> Result<ProviderKind> {
    ProviderKind::ALL
        .into_iter()
        .find(|kind| kind.matches(model))
        .ok_or_else(|| Error::unknown_model(model))
}

/// A backend able to answer prompts with text or schema-shaped JSON.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    /// Generate a free-text completion.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;

    /// Generate JSON text intended to satisfy `schema`.
    ///
    /// The returned text is not validated here; [`Model`](crate::Model)
    /// validates and deserializes it.
    async fn generate_json(
        &self,
        request: &GenerateRequest,
        schema: &JsonSchemaSpec,
    ) -> Result<String>;

    /// Which vendor this backend talks to.
    fn kind(&self) -> ProviderKind;

    /// The model used when a request names none.
    fn default_model(&self) -> &str;
}

/// Type alias for an Arc-wrapped provider.
pub type SharedProvider = Arc<dyn Provider>;
