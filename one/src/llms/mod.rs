//! LLM backend implementations.
//!
//! Each backend is organized into its own submodule and implements
//! [`Provider`](crate::Provider).
//!
//! # Available Backends
//!
//! - [`openai`] - `OpenAI` Chat Completions API (GPT-4o, o1, ...)
//! - [`anthropic`] - Anthropic Messages API (Claude)

pub mod anthropic;
pub mod openai;

pub use anthropic::{Anthropic, AnthropicConfig};
pub use openai::{OpenAI, OpenAIConfig};

use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{LlmError, Result};

/// Build the HTTP client shared by a backend's requests.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    builder
        .build()
        .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")).into())
}

/// Serialize a typed request body and overlay caller-supplied parameters.
///
/// Extra keys replace typed fields of the same name.
pub(crate) fn body_with_extra<T: serde::Serialize>(
    body: &T,
    extra: &Map<String, Value>,
) -> Result<Value> {
    let mut value = serde_json::to_value(body)?;
    if let Value::Object(ref mut map) = value {
        map.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Ok(value)
}
