//! AI Service - chat, speech synthesis and transcription adapters
//!
//! Forwards three capabilities to a remote AI service:
//! - `chat` - streamed chat completion as a lazy sequence of fragments
//! - `speech` - text-to-speech written to an audio file
//! - `transcriptions` - speech-to-text from an audio file
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the `AiService` capability interface
//! - `providers` module contains the concrete backends
//!
//! No retries or timeouts are applied here; failures surface to the caller
//! as `AiError`.
//!
//! # Example
//!
//! ```ignore
//! use ai_service::{AiContext, build_service};
//!
//! let ctx = AiContext::load(None)?;
//! let service = build_service(ctx)?;
//!
//! service.speech("Once upon a time...", Path::new("paragraph_0.mp3"), 0).await?;
//! let query = service.transcriptions(Path::new("voice_query.wav")).await?;
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{AiContext, AiProvider};
pub use error::AiError;
pub use ports::{AiService, build_service};
pub use providers::{OpenAIClient, UnconfiguredAiService};
pub use types::{AudioFormat, ChatMessage, ChatStream, Fragment, MessageRole};
