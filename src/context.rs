//! Bounded prompt assembly for a single model turn.

use crate::message::Role;
use crate::transcript::Transcript;

/// Default number of history messages included as conversational grounding.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Assembles the prompt sent to the model: system instructions, the most
/// recent slice of the transcript, and the pending message as the completion
/// cue.
///
/// Assembly is a pure function of the assembler's configuration and its
/// inputs; the window never reorders messages. The pending message is not
/// part of the history argument; it is appended once, as the cue.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    system_instructions: String,
    window_size: usize,
}

impl ContextAssembler {
    pub fn new(system_instructions: impl Into<String>) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            window_size: DEFAULT_CONTEXT_WINDOW,
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn build(&self, history: &Transcript, new_message: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.system_instructions);
        prompt.push_str("\n\n");

        for message in history.tail(self.window_size) {
            let label = match message.role {
                Role::User => "Human",
                Role::Assistant => "Assistant",
            };
            prompt.push_str(label);
            prompt.push_str(": ");
            prompt.push_str(&message.content);
            prompt.push('\n');
        }

        prompt.push_str("Human: ");
        prompt.push_str(new_message);
        prompt.push_str("\nAssistant:");
        prompt
    }
}
