//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use one::prelude::*;
//! ```

pub use crate::error::{Error, LlmError, LlmErrorKind, Result};
pub use crate::llms::{Anthropic, AnthropicConfig, OpenAI, OpenAIConfig};
pub use crate::model::Model;
pub use crate::provider::{Provider, ProviderKind, SharedProvider, detect_provider};
pub use crate::request::GenerateRequest;
pub use crate::schema::{JsonSchemaSpec, parse_structured};

pub use schemars::JsonSchema;
