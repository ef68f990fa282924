//! The session controller: owns the transcript for one active conversation
//! and drives the assemble → complete → append cycle per turn.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{AssistantConfig, DEFAULT_SYSTEM_PROMPT};
use crate::context::ContextAssembler;
use crate::error::{ChatError, Result};
use crate::export::{self, ChatStatistics};
use crate::llm::LanguageModel;
use crate::message::Message;
use crate::storage::TranscriptStore;
use crate::transcript::Transcript;
use crate::validate::MessageLimits;

/// Default cap on retained transcript length.
pub const DEFAULT_MAX_HISTORY: usize = 50;

const BILINGUAL_MARKERS: [&str; 3] = ["हिंदी", "Hinglish", "Hindi"];
const BILINGUAL_NOTE: &str =
    "\n\n*Note: Please ask me to translate this response into Hindi/Hinglish if needed.*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Generating,
}

/// One active conversation: the in-memory transcript, the model used to
/// answer, and the store that persists snapshots on explicit save.
///
/// Single-writer: one `ChatSession` owns one transcript, and a `submit`
/// while a reply is being generated is rejected with
/// [`ChatError::SessionBusy`]. In-flight calls are never cancelled by this
/// layer.
pub struct ChatSession<M: LanguageModel, S: TranscriptStore> {
    model: Arc<M>,
    store: S,
    assembler: ContextAssembler,
    limits: MessageLimits,
    transcript: Transcript,
    max_history: usize,
    bilingual_hint: bool,
    state: SessionState,
}

impl<M: LanguageModel, S: TranscriptStore> ChatSession<M, S> {
    pub fn new(model: Arc<M>, store: S) -> Self {
        Self {
            model,
            store,
            assembler: ContextAssembler::new(DEFAULT_SYSTEM_PROMPT),
            limits: MessageLimits::default(),
            transcript: Transcript::new(),
            max_history: DEFAULT_MAX_HISTORY,
            bilingual_hint: false,
            state: SessionState::Idle,
        }
    }

    /// Wires a session from the application configuration.
    pub fn from_config(model: Arc<M>, store: S, cfg: &AssistantConfig) -> Self {
        Self {
            model,
            store,
            assembler: ContextAssembler::new(cfg.system_prompt())
                .with_window_size(cfg.history.context_window),
            limits: MessageLimits::from(&cfg.message),
            transcript: Transcript::new(),
            max_history: cfg.history.max_messages.max(1),
            bilingual_hint: cfg.bilingual_hint,
            state: SessionState::Idle,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let window = self.assembler.window_size();
        self.assembler = ContextAssembler::new(prompt).with_window_size(window);
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.assembler = self.assembler.with_window_size(window);
        self
    }

    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    /// When enabled, successful replies that carry no Hindi/Hinglish marker
    /// get a fixed translation-offer note appended.
    pub fn with_bilingual_hint(mut self, enabled: bool) -> Self {
        self.bilingual_hint = enabled;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_generating(&self) -> bool {
        self.state == SessionState::Generating
    }

    /// Runs one turn: validates the message, sends the bounded context to
    /// the model, and appends both sides of the exchange to the transcript.
    ///
    /// A model failure does not fail the turn: it is recorded in-band as a
    /// synthetic assistant message carrying a remediation hint, so the
    /// transcript stays a complete audit log of the session.
    pub async fn submit(&mut self, message: &str) -> Result<Message> {
        if self.state == SessionState::Generating {
            return Err(ChatError::SessionBusy);
        }
        self.limits.validate(message)?;

        self.state = SessionState::Generating;
        // The pending message is excluded from the windowed history; it
        // enters the prompt once, as the completion cue.
        let prompt = self.assembler.build(&self.transcript, message);
        self.transcript.push(Message::user(message));

        let content = match self.model.complete(&prompt).await {
            Ok(content) if self.bilingual_hint => with_bilingual_hint(content),
            Ok(content) => content,
            Err(err) => {
                error!(error = %err, "model completion failed");
                match &err {
                    ChatError::Model { kind, .. } => {
                        format!("I could not generate a response. {}", kind.hint())
                    }
                    other => format!("I could not generate a response. {other}"),
                }
            }
        };

        let reply = Message::assistant(content);
        self.transcript.push(reply.clone());
        self.transcript.truncate_front(self.max_history);
        self.state = SessionState::Idle;
        Ok(reply)
    }

    pub fn clear_history(&mut self) {
        self.transcript.clear();
        info!("chat history cleared");
    }

    /// Persists a snapshot of the transcript; the in-memory transcript keeps
    /// evolving independently afterwards.
    pub async fn save_history(&self, custom_name: Option<&str>) -> Result<String> {
        self.store.save(&self.transcript, custom_name).await
    }

    /// Replaces the in-memory transcript with a previously saved one.
    pub async fn load_history(&mut self, filename: &str) -> Result<()> {
        self.transcript = self.store.load(filename).await?;
        Ok(())
    }

    pub async fn list_saved_files(&self) -> Result<Vec<String>> {
        self.store.list().await
    }

    pub fn export_as_text(&self) -> String {
        export::export_as_text(&self.transcript)
    }

    pub fn statistics(&self) -> ChatStatistics {
        export::statistics(&self.transcript)
    }
}

fn with_bilingual_hint(reply: String) -> String {
    if BILINGUAL_MARKERS.iter().any(|marker| reply.contains(marker)) {
        reply
    } else {
        reply + BILINGUAL_NOTE
    }
}
