//! One - a single client for `OpenAI` and Anthropic models
//!
//! This crate picks the right vendor from a model name and exposes the same
//! calls for both: plain text generation, and structured generation that
//! returns a Rust value validated against its JSON schema.
//!
//! ```rust,ignore
//! use one::Model;
//!
//! let model = Model::new("gpt-4o-mini")?;
//! let answer = model.generate("What is the capital of France?").await?;
//! ```

pub mod error;
pub mod llms;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod request;
pub mod schema;

pub use error::{Error, LlmError, LlmErrorKind, Result};
pub use llms::{Anthropic, AnthropicConfig, OpenAI, OpenAIConfig};
pub use model::Model;
pub use provider::{Provider, ProviderKind, SharedProvider, detect_provider};
pub use request::GenerateRequest;
pub use schema::{JsonSchemaSpec, parse_structured};

pub use schemars::JsonSchema;

/// Loads variables from a `.env` file in the current directory or its
/// parents, if one exists. Variables already set in the environment win.
#[cfg(feature = "dotenv")]
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Loading `.env` files is disabled without the `dotenv` feature.
#[cfg(not(feature = "dotenv"))]
pub const fn load_dotenv() {}
