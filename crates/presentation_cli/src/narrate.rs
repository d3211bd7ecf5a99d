//! Paragraph-level speech synthesis

use std::path::{Path, PathBuf};

use ai_service::{AiError, AiService, AudioFormat};
use futures::future::try_join_all;
use tracing::info;

/// Split text into paragraphs separated by blank lines
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

/// Output path for paragraph `index`
pub fn paragraph_path(dir: &Path, index: usize, format: AudioFormat) -> PathBuf {
    dir.join(format!("paragraph_{index}.{}", format.extension()))
}

/// Synthesize every paragraph concurrently; the first failure wins
pub async fn narrate(
    service: &dyn AiService,
    text: &str,
    output_dir: &Path,
    format: AudioFormat,
) -> Result<Vec<PathBuf>, AiError> {
    let paragraphs = split_paragraphs(text);
    let paths: Vec<PathBuf> = (0..paragraphs.len())
        .map(|index| paragraph_path(output_dir, index, format))
        .collect();

    info!(paragraphs = paragraphs.len(), "Synthesizing paragraphs");

    try_join_all(
        paragraphs
            .iter()
            .zip(&paths)
            .enumerate()
            .map(|(index, (paragraph, path))| service.speech(paragraph, path, index)),
    )
    .await?;

    Ok(paths)
}
