//! AI service backends
//!
//! - `openai` - OpenAI or any server exposing the same REST surface
//! - `unconfigured` - placeholder that implements no capability

pub mod openai;
pub mod streaming;
pub mod unconfigured;

pub use openai::OpenAIClient;
pub use unconfigured::UnconfiguredAiService;
