//! Logging initialization.

use tracing_subscriber::EnvFilter;

use crate::error::{ChatError, Result};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level is used. Fails if
/// a subscriber is already installed or the level does not parse.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|err| ChatError::Config(format!("invalid log level `{level}`: {err}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| ChatError::Config(format!("failed to initialize logging: {err}")))
}
