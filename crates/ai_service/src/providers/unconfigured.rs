//! Placeholder backend
//!
//! Used when no backend has been configured. Every capability fails with
//! `AiError::NotImplemented` and no I/O is performed.

use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use crate::error::AiError;
use crate::ports::AiService;
use crate::types::ChatStream;

/// Backend without any capability
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAiService;

impl UnconfiguredAiService {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AiService for UnconfiguredAiService {
    async fn chat(&self, _query: &str, _prompt: &str) -> Result<ChatStream, AiError> {
        warn!("chat invoked on an unconfigured AI backend");
        Err(AiError::NotImplemented("chat"))
    }

    async fn speech(
        &self,
        _text: &str,
        _output_path: &Path,
        index: usize,
    ) -> Result<(), AiError> {
        warn!(index, "speech invoked on an unconfigured AI backend");
        Err(AiError::NotImplemented("speech"))
    }

    async fn transcriptions(&self, _audio_file: &Path) -> Result<String, AiError> {
        warn!("transcriptions invoked on an unconfigured AI backend");
        Err(AiError::NotImplemented("transcriptions"))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}
