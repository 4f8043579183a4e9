//! `OpenAI` API client implementation.
//!
//! Text generation goes through the Chat Completions endpoint; structured
//! output uses its native `json_schema` response format.

mod chat;
mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
