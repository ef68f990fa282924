use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChatError, Result};
use crate::validate::{MessageLimits, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};

/// Instructions used when no system prompt file is present.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional life assistant. \
Give practical, structured advice on careers, interviews, productivity and \
everyday planning. Keep answers concise and actionable.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-pro".into()
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    #[serde(default = "default_history_dir")]
    pub dir: String,
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            dir: default_history_dir(),
            context_window: default_context_window(),
        }
    }
}

fn default_max_messages() -> usize {
    50
}

fn default_history_dir() -> String {
    "chat_histories".into()
}

fn default_context_window() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

impl From<&MessageConfig> for MessageLimits {
    fn from(cfg: &MessageConfig) -> Self {
        MessageLimits::new(cfg.min_chars, cfg.max_chars)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub message: MessageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_system_prompt_file")]
    pub system_prompt_file: String,
    #[serde(default)]
    pub bilingual_hint: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            history: HistoryConfig::default(),
            message: MessageConfig::default(),
            logging: LoggingConfig::default(),
            system_prompt_file: default_system_prompt_file(),
            bilingual_hint: false,
        }
    }
}

fn default_system_prompt_file() -> String {
    "system_prompt.txt".into()
}

impl AssistantConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref()).map_err(|err| {
            ChatError::Config(format!(
                "failed to read configuration `{}`: {err}",
                path.as_ref().display()
            ))
        })?;
        toml::from_str(&raw)
            .map_err(|err| ChatError::Config(format!("failed to parse configuration: {err}")))
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Builds a configuration from defaults and environment variables alone.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.model.model = model;
        }
        if let Ok(max) = env::var("MAX_CHAT_HISTORY") {
            if let Ok(parsed) = max.parse::<usize>() {
                self.history.max_messages = parsed;
            }
        }
        if let Ok(dir) = env::var("CHAT_HISTORY_DIR") {
            self.history.dir = dir;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Startup validation. A missing API credential is the one fatal
    /// configuration failure.
    pub fn validate(&self) -> Result<()> {
        match self.model.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ChatError::Config(
                "GEMINI_API_KEY is required but was not provided".into(),
            )),
        }
    }

    /// System instructions for the session: the configured prompt file when
    /// present, the built-in prompt otherwise.
    pub fn system_prompt(&self) -> String {
        match fs::read_to_string(&self.system_prompt_file) {
            Ok(prompt) if !prompt.trim().is_empty() => prompt.trim().to_string(),
            Ok(_) => DEFAULT_SYSTEM_PROMPT.to_string(),
            Err(err) => {
                warn!(
                    file = %self.system_prompt_file,
                    error = %err,
                    "system prompt file not readable, using the built-in prompt"
                );
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
        }
    }
}
