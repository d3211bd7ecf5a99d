//! OpenAI backend
//!
//! Implements `AiService` against the OpenAI REST API:
//! - chat: `POST /chat/completions` with `stream: true` (Server-Sent Events)
//! - speech: `POST /audio/speech`
//! - transcriptions: `POST /audio/transcriptions` (multipart upload)
//!
//! Each capability has its own base URL so the three can point at different
//! OpenAI-compatible servers.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::streaming::fragment_stream;
use crate::config::AiContext;
use crate::error::AiError;
use crate::ports::AiService;
use crate::types::{AudioFormat, ChatMessage, ChatStream};

/// OpenAI backend for chat, speech synthesis and transcription
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    ctx: AiContext,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    ///
    /// A single HTTP client is shared by the three capabilities; connection
    /// pooling is left to it.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Configuration` if the context is invalid.
    pub fn new(ctx: AiContext) -> Result<Self, AiError> {
        ctx.validate().map_err(AiError::Configuration)?;

        let mut builder = Client::builder();
        if let Some(timeout_ms) = ctx.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder
            .build()
            .map_err(|e| AiError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            llm_url = %ctx.llm_url,
            llm_model = %ctx.llm_model,
            tts_model = %ctx.tts_model,
            stt_model = %ctx.stt_model,
            "Initialized OpenAI client"
        );

        Ok(Self { client, ctx })
    }

    /// The context this client was built from
    pub const fn context(&self) -> &AiContext {
        &self.ctx
    }

    /// Attach bearer authentication
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.ctx.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Speech synthesis request body
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// Transcription response (`response_format=json`)
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI API error body
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Map a non-success response to an error, keeping the service's message
async fn error_from_response(response: Response) -> AiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    warn!(status = %status, "OpenAI request failed");

    let parsed = serde_json::from_str::<ApiError>(&body).ok();
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || parsed
            .as_ref()
            .and_then(|e| e.error.code.as_deref())
            .is_some_and(|code| code == "rate_limit_exceeded");

    let message = parsed.map_or(body, |e| e.error.message);

    if rate_limited {
        return AiError::RateLimited(message);
    }

    AiError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AiService for OpenAIClient {
    #[instrument(skip(self, query, prompt), fields(model = %self.ctx.llm_model, query_len = query.len()))]
    async fn chat(&self, query: &str, prompt: &str) -> Result<ChatStream, AiError> {
        let request = ChatRequest {
            model: &self.ctx.llm_model,
            messages: [ChatMessage::system(prompt), ChatMessage::user(query)],
            temperature: self.ctx.temperature,
            max_tokens: self.ctx.max_tokens,
            stream: true,
        };

        debug!("Starting streaming chat completion");

        let response = self
            .authorized(self.client.post(self.ctx.chat_endpoint()))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(fragment_stream(Box::pin(response.bytes_stream())))
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn speech(&self, text: &str, output_path: &Path, index: usize) -> Result<(), AiError> {
        debug!("Synthesizing audio for paragraph {index}...");

        let request = SpeechRequest {
            model: &self.ctx.tts_model,
            input: text,
            voice: &self.ctx.tts_voice,
            response_format: self.ctx.tts_format.as_str(),
        };

        let response = self
            .authorized(self.client.post(self.ctx.speech_endpoint()))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let audio = response.bytes().await?;

        debug!("Saving audio for paragraph {index}...");
        tokio::fs::write(output_path, &audio)
            .await
            .map_err(|source| AiError::OutputWrite {
                path: output_path.to_path_buf(),
                source,
            })?;
        debug!(
            "Paragraph {index} audio saved at {}",
            output_path.display()
        );

        Ok(())
    }

    #[instrument(skip(self), fields(model = %self.ctx.stt_model, language = %self.ctx.language))]
    async fn transcriptions(&self, audio_file: &Path) -> Result<String, AiError> {
        let data = tokio::fs::read(audio_file)
            .await
            .map_err(|source| AiError::FileAccess {
                path: audio_file.to_path_buf(),
                source,
            })?;

        debug!(audio_size = data.len(), "Transcribing audio file");

        let format = audio_file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioFormat::from_extension);
        let file_name = audio_file
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());

        let mut file_part = Part::bytes(data).file_name(file_name);
        if let Some(format) = format {
            file_part = file_part
                .mime_str(format.mime_type())
                .map_err(|e| AiError::RequestFailed(format!("Invalid MIME type: {e}")))?;
        }

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.ctx.stt_model.clone())
            .text("language", self.ctx.language.clone());

        let response = self
            .authorized(self.client.post(self.ctx.transcriptions_endpoint()))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(text_len = transcription.text.len(), "Transcription complete");

        Ok(transcription.text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
