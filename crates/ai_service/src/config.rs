//! Context for the AI service adapters
//!
//! Endpoints, credentials, model names and generation parameters. The
//! context is owned by the caller and never mutated by an adapter.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// OpenAI or any OpenAI-compatible server
    #[default]
    OpenAI,
    /// No backend; every capability reports not implemented
    Unconfigured,
}

/// Configuration record handed to an AI service adapter
#[derive(Clone, Serialize, Deserialize)]
pub struct AiContext {
    /// Backend to construct
    #[serde(default)]
    pub provider: AiProvider,

    /// API credential (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Base URL for speech-to-text
    #[serde(default = "default_base_url")]
    pub stt_url: String,

    /// Base URL for chat completions
    #[serde(default = "default_base_url")]
    pub llm_url: String,

    /// Base URL for text-to-speech
    #[serde(default = "default_base_url")]
    pub tts_url: String,

    /// Speech-to-text model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Chat model
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per chat call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Voice used for synthesis
    #[serde(default = "default_voice")]
    pub tts_voice: String,

    /// Audio format returned by synthesis
    #[serde(default)]
    pub tts_format: AudioFormat,

    /// ISO 639-1 language of spoken input
    #[serde(default = "default_language")]
    pub language: String,

    /// Optional transport timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl std::fmt::Debug for AiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiContext")
            .field("provider", &self.provider)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("stt_url", &self.stt_url)
            .field("llm_url", &self.llm_url)
            .field("tts_url", &self.tts_url)
            .field("stt_model", &self.stt_model)
            .field("llm_model", &self.llm_model)
            .field("tts_model", &self.tts_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("tts_voice", &self.tts_voice)
            .field("tts_format", &self.tts_format)
            .field("language", &self.language)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

const fn default_temperature() -> f32 {
    1.0
}

const fn default_max_tokens() -> u32 {
    1600
}

fn default_voice() -> String {
    "nova".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for AiContext {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            api_key: None,
            stt_url: default_base_url(),
            llm_url: default_base_url(),
            tts_url: default_base_url(),
            stt_model: default_stt_model(),
            llm_model: default_llm_model(),
            tts_model: default_tts_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            tts_voice: default_voice(),
            tts_format: AudioFormat::default(),
            language: default_language(),
            timeout_ms: None,
        }
    }
}

/// Join a base URL and an endpoint path, tolerating a trailing slash
fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl AiContext {
    /// Load the context from defaults, an optional TOML file and `FABLY_*`
    /// environment variables, in increasing order of precedence.
    ///
    /// Without an explicit path, `fably.toml` in the working directory is
    /// read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Self::load`], reading `FABLY_*` variables from `env` instead
    /// of the process environment when given
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::with_name("fably").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // e.g. FABLY_LLM_MODEL, FABLY_TEMPERATURE
            .add_source(
                config::Environment::with_prefix("FABLY")
                    .try_parsing(true)
                    .source(env),
            );

        builder.build()?.try_deserialize()
    }

    /// Replace the API credential
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider == AiProvider::OpenAI && self.api_key.is_none() {
            return Err("API key is required for the OpenAI provider".to_string());
        }

        for (name, url) in [
            ("stt_url", &self.stt_url),
            ("llm_url", &self.llm_url),
            ("tts_url", &self.tts_url),
        ] {
            if url.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        if self.max_tokens == 0 {
            return Err("Max tokens must be greater than 0".to_string());
        }

        if self.timeout_ms == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Speech-to-text endpoint
    pub fn transcriptions_endpoint(&self) -> String {
        endpoint(&self.stt_url, "audio/transcriptions")
    }

    /// Chat completions endpoint
    pub fn chat_endpoint(&self) -> String {
        endpoint(&self.llm_url, "chat/completions")
    }

    /// Text-to-speech endpoint
    pub fn speech_endpoint(&self) -> String {
        endpoint(&self.tts_url, "audio/speech")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    fn valid() -> AiContext {
        AiContext::default().with_api_key("test-key")
    }

    #[test]
    fn default_context_has_expected_values() {
        let ctx = AiContext::default();

        assert_eq!(ctx.provider, AiProvider::OpenAI);
        assert!(ctx.api_key.is_none());
        assert_eq!(ctx.llm_url, "https://api.openai.com/v1");
        assert_eq!(ctx.stt_model, "whisper-1");
        assert_eq!(ctx.llm_model, "gpt-3.5-turbo");
        assert_eq!(ctx.tts_model, "tts-1");
        assert!((ctx.temperature - 1.0).abs() < f32::EPSILON);
        assert_eq!(ctx.max_tokens, 1600);
        assert_eq!(ctx.tts_voice, "nova");
        assert_eq!(ctx.tts_format, AudioFormat::Mp3);
        assert_eq!(ctx.language, "en");
        assert!(ctx.timeout_ms.is_none());
    }

    #[test]
    fn validate_accepts_defaults_with_key() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_requires_key_for_openai() {
        let err = AiContext::default().validate().unwrap_err();
        assert!(err.contains("API key"));
    }

    #[test]
    fn unconfigured_provider_needs_no_key() {
        let ctx = AiContext {
            provider: AiProvider::Unconfigured,
            ..Default::default()
        };
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let ctx = AiContext {
            temperature: 2.5,
            ..valid()
        };
        assert!(ctx.validate().unwrap_err().contains("Temperature"));
    }

    #[test]
    fn validate_rejects_zero_max_tokens() {
        let ctx = AiContext {
            max_tokens: 0,
            ..valid()
        };
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_url() {
        let ctx = AiContext {
            tts_url: "  ".to_string(),
            ..valid()
        };
        assert!(ctx.validate().unwrap_err().contains("tts_url"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let ctx = AiContext {
            timeout_ms: Some(0),
            ..valid()
        };
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn endpoints_are_joined_per_capability() {
        let ctx = AiContext {
            stt_url: "http://stt.local/v1/".to_string(),
            llm_url: "http://llm.local/v1".to_string(),
            tts_url: "http://tts.local".to_string(),
            ..valid()
        };

        assert_eq!(
            ctx.transcriptions_endpoint(),
            "http://stt.local/v1/audio/transcriptions"
        );
        assert_eq!(ctx.chat_endpoint(), "http://llm.local/v1/chat/completions");
        assert_eq!(ctx.speech_endpoint(), "http://tts.local/audio/speech");
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", valid());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-key"));
    }

    #[test]
    fn serialization_skips_api_key() {
        let json = serde_json::to_string(&valid()).unwrap();
        assert!(!json.contains("api_key"));
        assert!(json.contains("llm_model"));
    }

    #[test]
    fn deserialization_with_defaults() {
        let ctx: AiContext = toml::from_str(
            r#"
            api_key = "sk-test"
            llm_model = "gpt-4o-mini"
            tts_format = "opus"
            "#,
        )
        .unwrap();

        assert_eq!(ctx.llm_model, "gpt-4o-mini");
        assert_eq!(ctx.tts_format, AudioFormat::Opus);
        assert_eq!(ctx.tts_voice, "nova");
        assert_eq!(
            ctx.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("sk-test".to_string())
        );
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_key = \"sk-file\"\nllm_url = \"http://localhost:8080/v1\"\nmax_tokens = 42\nlanguage = \"de\""
        )
        .unwrap();

        let ctx = AiContext::load(Some(file.path())).unwrap();

        assert_eq!(ctx.llm_url, "http://localhost:8080/v1");
        assert_eq!(ctx.max_tokens, 42);
        assert_eq!(ctx.language, "de");
        assert_eq!(ctx.stt_model, "whisper-1");
        assert!(ctx.api_key.is_some());
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "llm_model = \"gpt-file\"\nmax_tokens = 42\nlanguage = \"de\"").unwrap();

        let env = [
            ("FABLY_LLM_MODEL", "gpt-env"),
            ("FABLY_MAX_TOKENS", "7"),
            ("OTHER_LANGUAGE", "fr"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let ctx = AiContext::load_with_env(Some(file.path()), Some(env)).unwrap();

        assert_eq!(ctx.llm_model, "gpt-env");
        assert_eq!(ctx.max_tokens, 7);
        assert_eq!(ctx.language, "de");
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AiContext::load(Some(&missing)).is_err());
    }
}
