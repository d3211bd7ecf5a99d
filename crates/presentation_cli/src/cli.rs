//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fably CLI
#[derive(Debug, Parser)]
#[command(name = "fably-cli")]
#[command(author, version, about = "Chat, speech synthesis and transcription from the command line", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./fably.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key for the remote service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Stream a chat completion to stdout
    Chat {
        /// Query to send
        query: String,

        /// System prompt
        #[arg(short, long, conflicts_with = "prompt_file")]
        prompt: Option<String>,

        /// File holding the system prompt
        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// Synthesize text into an audio file
    Speak {
        /// Text to synthesize
        text: String,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,

        /// Paragraph ordinal used in log output
        #[arg(long, default_value = "0")]
        index: usize,
    },

    /// Synthesize every paragraph of a text file concurrently
    ///
    /// Paragraphs are separated by blank lines and written as
    /// paragraph_<index>.<format> into the output directory.
    Narrate {
        /// Text file to read
        input: PathBuf,

        /// Directory for the audio files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Transcribe an audio file to stdout
    Transcribe {
        /// Audio file to transcribe
        audio: PathBuf,
    },
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
