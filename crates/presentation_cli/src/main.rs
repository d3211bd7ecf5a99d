//! Fably CLI
//!
//! Command-line access to the chat, speech and transcription adapters.

#![allow(clippy::print_stdout)]

mod cli;
mod narrate;

use std::io::Write;

use ai_service::{AiContext, build_service};
use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, log_filter_from_verbosity};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut ctx = AiContext::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(api_key) = cli.api_key {
        ctx = ctx.with_api_key(api_key);
    }
    let format = ctx.tts_format;

    let service = build_service(ctx)?;
    tracing::debug!(backend = service.name(), "AI service ready");

    match cli.command {
        Commands::Chat {
            query,
            prompt,
            prompt_file,
        } => {
            let prompt = match (prompt, prompt_file) {
                (Some(prompt), _) => prompt,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read prompt from {}", path.display()))?,
                (None, None) => String::new(),
            };

            let mut fragments = service.chat(&query, &prompt).await?;
            let mut stdout = std::io::stdout();

            while let Some(fragment) = fragments.next().await {
                write!(stdout, "{}", fragment?)?;
                stdout.flush()?;
            }
            println!();
        },

        Commands::Speak {
            text,
            output,
            index,
        } => {
            service.speech(&text, &output, index).await?;
            println!("🔊 Audio saved at {}", output.display());
        },

        Commands::Narrate { input, output_dir } => {
            let text = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            tokio::fs::create_dir_all(&output_dir)
                .await
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;

            let paths = narrate::narrate(service.as_ref(), &text, &output_dir, format).await?;

            for path in paths {
                println!("🔊 {}", path.display());
            }
        },

        Commands::Transcribe { audio } => {
            let transcript = service.transcriptions(&audio).await?;
            println!("{transcript}");
        },
    }

    Ok(())
}
