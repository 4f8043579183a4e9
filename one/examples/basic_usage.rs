//! Basic usage: the same calls against `OpenAI` and Anthropic.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! export ANTHROPIC_API_KEY=sk-ant-...
//! cargo run --example basic_usage
//! ```

#![allow(clippy::print_stdout)]

use one::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    for name in ["gpt-4o-mini", "claude-3-5-sonnet-20241022"] {
        let model = Model::new(name)?;
        let answer = model.generate("What is the capital of France?").await?;
        println!("[{}] {answer}", model.provider_kind());
    }

    let model = Model::for_provider("anthropic".parse()?)?;
    let request = GenerateRequest::new("Write a haiku about Rust.")
        .temperature(0.9)
        .max_tokens(100);
    println!("{}", model.generate_with(request).await?);

    Ok(())
}
