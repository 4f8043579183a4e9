//! Anthropic client configuration.

use crate::error::{LlmError, Result};

/// Configuration for the Anthropic client.
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (defaults to Anthropic's API).
    pub base_url: String,
    /// Default model to use.
    pub model: String,
    /// Value of the `anthropic-version` header.
    pub version: String,
    /// Max tokens sent when a request does not set any; the API requires one.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl AnthropicConfig {
    /// Default Anthropic API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = super::DEFAULT_MODEL;
    /// Default API version.
    pub const DEFAULT_VERSION: &'static str = super::ANTHROPIC_VERSION_2023_06_01;
    /// Default max tokens.
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `ANTHROPIC_API_KEY` - Required API key
    /// - `ANTHROPIC_BASE_URL` - Optional base URL
    /// - `ANTHROPIC_MODEL` - Optional default model
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `ANTHROPIC_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            LlmError::auth("anthropic", "ANTHROPIC_API_KEY environment variable not set")
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the `anthropic-version` header value.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the fallback max tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            version: Self::DEFAULT_VERSION.to_owned(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("version", &self.version)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = AnthropicConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://api.anthropic.com");
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.version, "2023-06-01");
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn test_config_builder() {
        let config = AnthropicConfig::new("key")
            .with_model("claude-3-opus-20240229")
            .with_version("2024-01-01")
            .with_max_tokens(4096)
            .with_timeout(30);

        assert_eq!(config.model, "claude-3-opus-20240229");
        assert_eq!(config.version, "2024-01-01");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.timeout_secs, Some(30));
    }
}
