//! Server-Sent Events decoding for streamed chat completions
//!
//! The chat endpoint answers with `data: {json}` events. Each event carries a
//! `chat.completion.chunk` whose first choice holds a content delta. Events
//! may be split across arbitrary network reads, so complete lines are cut
//! from a byte buffer before they are parsed.

use std::collections::VecDeque;
use std::fmt::Display;

use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::AiError;
use crate::types::ChatStream;

/// Streamed `chat.completion.chunk`
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// What a single event means for the fragment sequence
#[derive(Debug, PartialEq, Eq)]
enum ChunkEvent {
    Fragment(String),
    Skip,
    Finished,
}

/// Decide what a chunk contributes to the sequence.
///
/// Chunks without choices are skipped. The opening chunk announces the
/// assistant role with empty content and is skipped as well. Any other
/// chunk without content ends the sequence.
fn classify(chunk: ChatCompletionChunk) -> ChunkEvent {
    let Some(choice) = chunk.choices.into_iter().next() else {
        return ChunkEvent::Skip;
    };

    let delta = choice.delta.unwrap_or_default();
    match delta.content {
        Some(content) if !content.is_empty() => ChunkEvent::Fragment(content),
        _ if delta.role.is_some() && choice.finish_reason.is_none() => ChunkEvent::Skip,
        _ => ChunkEvent::Finished,
    }
}

/// Parse one SSE line; `None` for lines that carry no event
fn parse_line(line: &str) -> Option<Result<ChunkEvent, AiError>> {
    let data = line.trim_end_matches('\r').strip_prefix("data:")?.trim_start();

    if data.is_empty() {
        return None;
    }

    if data == "[DONE]" {
        return Some(Ok(ChunkEvent::Finished));
    }

    trace!(data = %data, "Parsing stream chunk");

    Some(
        serde_json::from_str::<ChatCompletionChunk>(data)
            .map(classify)
            .map_err(|e| AiError::InvalidResponse(format!("JSON parse error: {e}"))),
    )
}

struct SseDecoder<S> {
    bytes: S,
    buffer: Vec<u8>,
    pending: VecDeque<Result<ChunkEvent, AiError>>,
    closed: bool,
}

impl<S> SseDecoder<S> {
    const fn new(bytes: S) -> Self {
        Self {
            bytes,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            closed: false,
        }
    }

    /// Append a network read and queue every complete line
    fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.decode_line(&line[..pos]);
        }
    }

    /// Queue the unterminated tail once the transport is exhausted
    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line);
        }
    }

    fn decode_line(&mut self, line: &[u8]) {
        match std::str::from_utf8(line) {
            Ok(text) => {
                if let Some(event) = parse_line(text) {
                    self.pending.push_back(event);
                }
            },
            Err(e) => self
                .pending
                .push_back(Err(AiError::InvalidResponse(format!("Invalid UTF-8: {e}")))),
        }
    }
}

/// Turn a raw SSE byte stream into a lazy sequence of chat fragments
///
/// Bytes are only pulled from `bytes` while the consumer polls. The first
/// error is yielded as an item and ends the sequence.
pub fn fragment_stream<S, B, E>(bytes: S) -> ChatStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let fragments = stream::unfold(Some(SseDecoder::new(bytes)), |state| async move {
        let mut decoder = state?;

        loop {
            if let Some(event) = decoder.pending.pop_front() {
                match event {
                    Ok(ChunkEvent::Fragment(text)) => return Some((Ok(text), Some(decoder))),
                    Ok(ChunkEvent::Skip) => continue,
                    Ok(ChunkEvent::Finished) => {
                        debug!("Chat stream finished");
                        return None;
                    },
                    Err(e) => return Some((Err(e), None)),
                }
            }

            if decoder.closed {
                debug!("Chat stream closed without completion signal");
                return None;
            }

            match decoder.bytes.next().await {
                Some(Ok(bytes)) => decoder.push(bytes.as_ref()),
                Some(Err(e)) => return Some((Err(AiError::StreamError(e.to_string())), None)),
                None => {
                    decoder.closed = true;
                    decoder.flush();
                },
            }
        }
    });

    Box::pin(fragments)
}
