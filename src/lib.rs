//! Conversation engine for a Gemini-backed personal assistant.
//!
//! The crate provides the pieces behind a chat front-end:
//! - A bounded context assembler (`ContextAssembler`) deciding what history
//!   is sent to the model each turn.
//! - A session controller (`ChatSession`) owning the transcript lifecycle:
//!   validation, in-band failure recording, and the history cap.
//! - A `LanguageModel` seam with a Gemini client and a scripted stub.
//! - File-backed transcript persistence plus export/statistics helpers.

mod config;
mod context;
mod error;
mod export;
mod llm;
mod message;
mod session;
mod storage;
mod telemetry;
mod transcript;
mod validate;

pub use config::{
    AssistantConfig, HistoryConfig, LoggingConfig, MessageConfig, ModelConfig,
    DEFAULT_SYSTEM_PROMPT,
};
pub use context::{ContextAssembler, DEFAULT_CONTEXT_WINDOW};
pub use error::{ChatError, ModelErrorKind, Result};
pub use export::{export_as_text, export_as_text_at, statistics, ChatStatistics, EMPTY_EXPORT};
pub use llm::{recommended_model, GeminiClient, LanguageModel, StubModel};
pub use message::{Message, Role};
pub use session::{ChatSession, DEFAULT_MAX_HISTORY};
pub use storage::{sanitize_filename, FileTranscriptStore, TranscriptStore};
pub use telemetry::init_logging;
pub use transcript::Transcript;
pub use validate::{MessageLimits, ValidationError};
