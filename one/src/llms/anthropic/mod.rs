//! Anthropic API client implementation.
//!
//! Integrates with the Messages API. Anthropic has no native structured
//! output mode, so schema-constrained calls describe the schema in the system
//! prompt and leave validation to the caller.

mod chat;
mod client;
mod config;
mod types;

pub use chat::schema_system_prompt;
pub use client::Anthropic;
pub use config::AnthropicConfig;

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Anthropic API version 2023-06-01.
pub const ANTHROPIC_VERSION_2023_06_01: &str = "2023-06-01";
