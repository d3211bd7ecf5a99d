//! Port definitions for AI services
//!
//! Defines the capability interface that every backend implements and the
//! constructor that picks a backend from the context.

use std::path::Path;

use async_trait::async_trait;

use crate::config::{AiContext, AiProvider};
use crate::error::AiError;
use crate::providers::{OpenAIClient, UnconfiguredAiService};
use crate::types::ChatStream;

/// Port for AI service backends
///
/// Each call is an independent request/response cycle; implementations hold
/// no per-call state, so calls may be interleaved freely by the caller.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let service = ai_service::build_service(ctx)?;
/// let mut fragments = service.chat("Tell me a story about a fox", prompt).await?;
/// while let Some(fragment) = fragments.next().await {
///     print!("{}", fragment?);
/// }
/// ```
#[async_trait]
pub trait AiService: Send + Sync {
    /// Stream a chat completion for `query` under the system `prompt`
    ///
    /// # Returns
    ///
    /// A lazy sequence of text fragments in arrival order. The sequence ends
    /// when the service signals completion or the stream closes. Dropping it
    /// abandons the remaining response.
    ///
    /// # Errors
    ///
    /// Returns `AiError` if the request cannot be issued or is rejected.
    /// Failures after the stream has started are yielded as items.
    async fn chat(&self, query: &str, prompt: &str) -> Result<ChatStream, AiError>;

    /// Synthesize `text` and write the audio to `output_path`
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `output_path` - File to create or overwrite
    /// * `index` - Paragraph ordinal used only to label log events; pass 0
    ///   for a single synthesis
    ///
    /// # Errors
    ///
    /// Returns `AiError` if synthesis or writing the file fails. A partially
    /// written file is left in place.
    async fn speech(&self, text: &str, output_path: &Path, index: usize) -> Result<(), AiError>;

    /// Transcribe the audio file at `audio_file`
    ///
    /// # Errors
    ///
    /// Returns `AiError::FileAccess` without contacting the service if the
    /// file cannot be read, otherwise `AiError` for remote failures.
    async fn transcriptions(&self, audio_file: &Path) -> Result<String, AiError>;

    /// Backend name for diagnostics
    fn name(&self) -> &str;
}

/// Construct the backend selected by `ctx.provider`
///
/// # Errors
///
/// Returns `AiError::Configuration` if the context is invalid for the
/// selected backend.
pub fn build_service(ctx: AiContext) -> Result<Box<dyn AiService>, AiError> {
    match ctx.provider {
        AiProvider::OpenAI => Ok(Box::new(OpenAIClient::new(ctx)?)),
        AiProvider::Unconfigured => Ok(Box::new(UnconfiguredAiService::new())),
    }
}
