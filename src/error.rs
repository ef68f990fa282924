use thiserror::Error;

use crate::validate::ValidationError;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Best-effort classification of a model-service failure.
///
/// The classification is advisory: it selects the remediation hint shown to
/// the user and never drives retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorKind {
    Auth,
    Quota,
    ModelUnavailable,
    Unknown,
}

impl ModelErrorKind {
    /// Classifies a failure by inspecting its text.
    pub fn classify(detail: &str) -> Self {
        let lower = detail.to_ascii_lowercase();
        if lower.contains("api_key") || lower.contains("api key") || lower.contains("authentication")
        {
            ModelErrorKind::Auth
        } else if lower.contains("quota") || lower.contains("limit") {
            ModelErrorKind::Quota
        } else if lower.contains("model") {
            ModelErrorKind::ModelUnavailable
        } else {
            ModelErrorKind::Unknown
        }
    }

    /// A user-facing remediation hint for this failure class.
    pub fn hint(&self) -> &'static str {
        match self {
            ModelErrorKind::Auth => {
                "The model service rejected the API credential. \
                 Verify the configured API key and its permissions."
            }
            ModelErrorKind::Quota => {
                "The model service reported a quota or rate limit problem. \
                 Wait a few minutes or check your usage limits."
            }
            ModelErrorKind::ModelUnavailable => {
                "The configured model appears to be unavailable. \
                 Check the model identifier or switch to another model."
            }
            ModelErrorKind::Unknown => {
                "The model service returned an unexpected error. Please try again."
            }
        }
    }
}

impl std::fmt::Display for ModelErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ModelErrorKind::Auth => "auth",
            ModelErrorKind::Quota => "quota",
            ModelErrorKind::ModelUnavailable => "model_unavailable",
            ModelErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationError),

    #[error("model request failed ({kind}): {message}")]
    Model {
        kind: ModelErrorKind,
        message: String,
    },

    #[error("a reply is already being generated for this session")]
    SessionBusy,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("transcript `{0}` not found")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_substring() {
        assert_eq!(
            ModelErrorKind::classify("API key not valid. Please pass a valid API key."),
            ModelErrorKind::Auth
        );
        assert_eq!(
            ModelErrorKind::classify("authentication failed"),
            ModelErrorKind::Auth
        );
        assert_eq!(
            ModelErrorKind::classify("Resource has been exhausted: check quota"),
            ModelErrorKind::Quota
        );
        assert_eq!(
            ModelErrorKind::classify("rate limit exceeded"),
            ModelErrorKind::Quota
        );
        assert_eq!(
            ModelErrorKind::classify("models/gemini-nope is not found"),
            ModelErrorKind::ModelUnavailable
        );
        assert_eq!(
            ModelErrorKind::classify("connection reset by peer"),
            ModelErrorKind::Unknown
        );
    }

    #[test]
    fn auth_wins_over_model_mention() {
        // Failure text often names the model as well; the credential problem
        // is the actionable one.
        assert_eq!(
            ModelErrorKind::classify("authentication failed for models/gemini-pro"),
            ModelErrorKind::Auth
        );
    }
}
