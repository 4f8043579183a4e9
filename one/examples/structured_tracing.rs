//! Structured output with tracing enabled.
//!
//! Prints the request spans to stderr and a schema-validated struct to
//! stdout. Set `MODEL` to switch vendors.
//!
//! ```bash
//! export ANTHROPIC_API_KEY=sk-ant-...
//! MODEL=claude-3-5-sonnet-20241022 cargo run --example structured_tracing
//! ```

#![allow(clippy::print_stdout)]

use anyhow::Context;
use one::prelude::*;
use serde::Deserialize;

/// A person extracted from free text.
#[derive(Debug, Deserialize, JsonSchema)]
struct Person {
    /// Full name.
    name: String,
    /// Age in years.
    age: u32,
    /// Occupation, if mentioned.
    occupation: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter("one=debug")
        .init();

    let name = std::env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_owned());
    let model = Model::new(&name).with_context(|| format!("cannot use model `{name}`"))?;

    let request = GenerateRequest::new(
        "Extract the person: Ada Lovelace, 36, wrote the first published algorithm.",
    )
    .temperature(0.0);
    let person: Person = model
        .generate_structured_with(request)
        .await
        .context("structured generation failed")?;

    println!("{person:#?}");

    Ok(())
}
