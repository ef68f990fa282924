use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Ordered conversation history for one session, oldest message first.
///
/// Append-only during normal operation; when the configured cap is exceeded
/// the oldest messages are dropped from the front so the most recent turns
/// are always retained.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The most recent `window` messages, in conversation order.
    pub fn tail(&self, window: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(window);
        &self.messages[start..]
    }

    /// Drops the oldest messages until at most `max_len` remain.
    pub fn truncate_front(&mut self, max_len: usize) {
        if self.messages.len() > max_len {
            let excess = self.messages.len() - max_len;
            self.messages.drain(..excess);
        }
    }
}
