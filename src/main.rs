//! Demo binary for tsugi: send one prompt through the orchestrator.
//!
//! Loads environment variables, builds an orchestrator over the file-backed
//! settings store, and prints the reply with the provider that served it.
//! The interesting machinery lives in the library; this is a thin shell.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use tsugi::{
    ChatRequest, CredentialOverrides, FileSettings, Message, NoopLogger, Orchestrator,
    ProviderKind,
};

/// Send a prompt to the configured LLM providers with automatic fallback.
#[derive(Parser)]
#[command(name = "tsugi", about = "Multi-provider LLM chat with automatic fallback")]
struct Cli {
    /// The prompt to send
    prompt: Vec<String>,

    /// Provider to use (claude, openai, gemini, kimi, groq)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model identifier, overriding the provider's default
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum output tokens
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let prompt = cli.prompt.join(" ");
    anyhow::ensure!(!prompt.trim().is_empty(), "No prompt given");

    let settings = Arc::new(FileSettings::open()?);
    let orchestrator =
        Orchestrator::new(settings, Arc::new(NoopLogger), &CredentialOverrides::new()).await;

    let available = orchestrator.registry().available();
    anyhow::ensure!(
        !available.is_empty(),
        "No providers configured. Set an API key (e.g. GROQ_API_KEY or GEMINI_API_KEY)."
    );

    let mut request = ChatRequest::new(vec![Message::user(prompt)]);
    if let Some(name) = cli.provider.as_deref() {
        request = request.with_provider(name.parse::<ProviderKind>()?);
    }
    if let Some(model) = cli.model {
        request = request.with_model(model);
    }
    if let Some(max_tokens) = cli.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = cli.temperature {
        request = request.with_temperature(temperature);
    }

    match orchestrator.chat(request).await {
        Ok(reply) => {
            let tag = format!("[{} / {}]", reply.provider, reply.model);
            println!("{}", tag.cyan().bold());
            if let Some(from) = reply.fallback_from {
                println!("{}", format!("(fell back from {from})").dimmed());
            }
            println!("{}", reply.text);
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            std::process::exit(1);
        }
    }
}
