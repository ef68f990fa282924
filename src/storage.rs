//! File-backed persistence for conversation transcripts.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{ChatError, Result};
use crate::message::Message;
use crate::transcript::Transcript;

/// Characters replaced with `_` in user-supplied save names.
const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const DEFAULT_SAVE_STEM: &str = "chat_history";

/// On-disk form of a saved transcript.
#[derive(Debug, Serialize, Deserialize)]
struct TranscriptDocument {
    timestamp: String,
    message_count: usize,
    messages: Vec<Message>,
}

/// Parse shape for stored files: the wrapped document is attempted first,
/// with a bare message array accepted as the legacy format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredTranscript {
    Wrapped(TranscriptDocument),
    Legacy(Vec<Message>),
}

/// Generic persistence contract for saved transcripts.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Writes a snapshot of the transcript, returning the created filename.
    async fn save(&self, transcript: &Transcript, custom_name: Option<&str>) -> Result<String>;
    async fn load(&self, filename: &str) -> Result<Transcript>;
    /// Saved filenames, newest first. A missing directory yields an empty
    /// listing, never an error.
    async fn list(&self) -> Result<Vec<String>>;
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Stores each saved transcript as a pretty-printed JSON document in a
/// single directory. Every save gets a new timestamp-qualified filename;
/// a same-name same-second collision is an accepted limitation.
pub struct FileTranscriptStore {
    dir: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn save(&self, transcript: &Transcript, custom_name: Option<&str>) -> Result<String> {
        fs::create_dir_all(&self.dir).await.map_err(|err| {
            ChatError::Storage(format!(
                "failed to create history directory `{}`: {err}",
                self.dir.display()
            ))
        })?;

        let now = Local::now();
        let stem = custom_name
            .map(sanitize_filename)
            .unwrap_or_else(|| DEFAULT_SAVE_STEM.to_string());
        let filename = format!("{stem}_{}.json", now.format("%Y%m%d_%H%M%S"));

        let document = TranscriptDocument {
            timestamp: now.to_rfc3339(),
            message_count: transcript.len(),
            messages: transcript.messages().to_vec(),
        };
        let payload = serde_json::to_string_pretty(&document)?;

        fs::write(self.dir.join(&filename), payload)
            .await
            .map_err(|err| {
                ChatError::Storage(format!("failed to write transcript `{filename}`: {err}"))
            })?;

        info!(%filename, messages = transcript.len(), "chat history saved");
        Ok(filename)
    }

    async fn load(&self, filename: &str) -> Result<Transcript> {
        let path = self.dir.join(filename);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(%filename, "chat history file not found");
                return Err(ChatError::NotFound(filename.to_string()));
            }
            Err(err) => {
                return Err(ChatError::Storage(format!(
                    "failed to read transcript `{filename}`: {err}"
                )))
            }
        };

        let messages = match serde_json::from_str::<StoredTranscript>(&raw)? {
            StoredTranscript::Wrapped(document) => document.messages,
            StoredTranscript::Legacy(messages) => messages,
        };

        info!(%filename, count = messages.len(), "chat history loaded");
        Ok(Transcript::with_messages(messages))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(ChatError::Storage(format!(
                    "failed to read history directory `{}`: {err}",
                    self.dir.display()
                )))
            }
        };

        let mut entries: Vec<(SystemTime, String)> = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|err| {
            ChatError::Storage(format!("failed to iterate history directory: {err}"))
        })? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".json") {
                continue;
            }
            let metadata = entry.metadata().await.map_err(|err| {
                ChatError::Storage(format!("failed to stat `{name}`: {err}"))
            })?;
            // Creation time is not available on every filesystem.
            let stamp = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((stamp, name));
        }

        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries.into_iter().map(|(_, name)| name).collect())
    }
}
