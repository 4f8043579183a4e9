//! Generation request parameters shared by every provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use one::GenerateRequest;
//!
//! let request = GenerateRequest::new("What is the capital of France?")
//!     .model("gpt-4o")
//!     .temperature(0.2)
//!     .max_tokens(50)
//!     .param("seed", 7);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sampling temperature used when the caller does not set one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A single-prompt generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The user prompt.
    pub prompt: String,

    /// Model identifier; the backend default applies when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Optional system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Nucleus sampling parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Provider-specific parameters merged verbatim into the request body.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

const fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl GenerateRequest {
    /// Creates a request for `prompt` with default sampling parameters.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            system: None,
            top_p: None,
            stop: None,
            extra: Map::new(),
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens to generate.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the nucleus sampling parameter.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets stop sequences.
    #[must_use]
    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Adds one provider-specific parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Replaces all provider-specific parameters.
    #[must_use]
    pub fn extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    /// Returns the requested model, or `fallback` when none was set.
    #[must_use]
    pub fn model_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(fallback)
    }
}

impl From<&str> for GenerateRequest {
    fn from(prompt: &str) -> Self {
        Self::new(prompt)
    }
}

impl From<String> for GenerateRequest {
    fn from(prompt: String) -> Self {
        Self::new(prompt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_uses_defaults() {
        let req = GenerateRequest::new("hi");
        assert_eq!(req.prompt, "hi");
        assert!(req.model.is_none());
        assert_eq!(req.temperature, 0.7);
        assert!(req.max_tokens.is_none());
        assert!(req.extra.is_empty());
    }

    #[test]
    fn builder_chain() {
        let req = GenerateRequest::new("Test prompt")
            .model("gpt-4")
            .temperature(0.5)
            .max_tokens(100)
            .system("Be brief.")
            .top_p(0.9)
            .stop(vec!["END".into()])
            .param("seed", 42);

        assert_eq!(req.model.as_deref(), Some("gpt-4"));
        assert_eq!(req.temperature, 0.5);
        assert_eq!(req.max_tokens, Some(100));
        assert_eq!(req.system.as_deref(), Some("Be brief."));
        assert_eq!(req.top_p, Some(0.9));
        assert_eq!(req.stop.as_deref(), Some(&["END".to_owned()][..]));
        assert_eq!(req.extra["seed"], json!(42));
    }

    #[test]
    fn model_or_falls_back() {
        let req = GenerateRequest::new("x");
        assert_eq!(req.model_or("gpt-4o-mini"), "gpt-4o-mini");
        let req = req.model("o1-mini");
        assert_eq!(req.model_or("gpt-4o-mini"), "o1-mini");
    }

    #[test]
    fn serde_skips_none_and_defaults_temperature() {
        let value = serde_json::to_value(GenerateRequest::new("x")).unwrap();
        assert_eq!(value, json!({ "prompt": "x", "temperature": 0.7_f32 }));

        let parsed: GenerateRequest = serde_json::from_value(json!({ "prompt": "y" })).unwrap();
        assert_eq!(parsed.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn from_str_and_string() {
        assert_eq!(GenerateRequest::from("a").prompt, "a");
        assert_eq!(GenerateRequest::from(String::from("b")).prompt, "b");
    }
}
