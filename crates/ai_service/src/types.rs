//! Types shared by the AI service adapters
//!
//! Audio formats understood by the speech endpoints, chat messages and the
//! streaming fragment type returned by chat.

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Audio formats produced by speech synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format
    #[default]
    Mp3,
    /// Opus codec in an Ogg container
    Opus,
    /// AAC in an ADTS stream
    Aac,
    /// FLAC format (lossless)
    Flac,
    /// WAV format (uncompressed)
    Wav,
    /// Raw 16-bit PCM samples
    Pcm,
}

impl AudioFormat {
    /// Wire name used in `response_format`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// File extension for persisted audio
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// MIME type sent with uploaded audio
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/ogg",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "audio/pcm",
        }
    }

    /// Guess the format from a file extension (without the dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" | "mpeg" | "mpga" => Some(Self::Mp3),
            "opus" | "ogg" | "oga" => Some(Self::Opus),
            "aac" | "m4a" | "mp4" => Some(Self::Aac),
            "flac" => Some(Self::Flac),
            "wav" => Some(Self::Wav),
            "pcm" => Some(Self::Pcm),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "opus" => Ok(Self::Opus),
            "aac" => Ok(Self::Aac),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            "pcm" => Ok(Self::Pcm),
            other => Err(format!("Unsupported audio format: {other}")),
        }
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A single chat message in the OpenAI wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// System instruction message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// User query message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// One incremental piece of generated chat text
pub type Fragment = String;

/// Lazy, single-pass sequence of chat fragments in arrival order
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<Fragment, AiError>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(AudioFormat::Mp3.as_str(), "mp3");
        assert_eq!(AudioFormat::Opus.as_str(), "opus");
        assert_eq!(AudioFormat::Aac.as_str(), "aac");
        assert_eq!(AudioFormat::Pcm.as_str(), "pcm");
    }

    #[test]
    fn extension_matches_response_format() {
        assert_eq!(AudioFormat::Aac.extension(), "aac");
        assert_eq!(AudioFormat::Wav.extension(), "wav");
        assert_eq!(AudioFormat::Opus.extension(), "opus");
    }

    #[test]
    fn aac_is_uploaded_as_adts() {
        assert_eq!(AudioFormat::Aac.mime_type(), "audio/aac");
    }

    #[test]
    fn from_extension_is_case_insensitive() {
        assert_eq!(AudioFormat::from_extension("WAV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_extension("m4a"), Some(AudioFormat::Aac));
        assert_eq!(AudioFormat::from_extension("ogg"), Some(AudioFormat::Opus));
        assert_eq!(AudioFormat::from_extension("mpga"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("txt"), None);
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("flac".parse::<AudioFormat>(), Ok(AudioFormat::Flac));
        assert_eq!("MP3".parse::<AudioFormat>(), Ok(AudioFormat::Mp3));
        assert!("midi".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(AudioFormat::Opus.to_string(), "opus");
    }

    #[test]
    fn audio_format_serde_is_lowercase() {
        let json = serde_json::to_string(&AudioFormat::Flac).unwrap();
        assert_eq!(json, "\"flac\"");
        let parsed: AudioFormat = serde_json::from_str("\"wav\"").unwrap();
        assert_eq!(parsed, AudioFormat::Wav);
    }

    #[test]
    fn chat_message_serialization() {
        let msg = ChatMessage::system("Be brief");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "system", "content": "Be brief"})
        );
        assert_eq!(ChatMessage::user("hi").role, MessageRole::User);
    }

    #[test]
    fn only_system_and_user_roles_are_accepted() {
        let parsed: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, MessageRole::User);
        assert!(serde_json::from_str::<MessageRole>("\"assistant\"").is_err());
    }
}
