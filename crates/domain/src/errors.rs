//! Error types used throughout the tap

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the tap
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TapError {
    /// Missing required config key, unresolvable stream schema, bad catalog.
    /// Pre-flight and fatal; no partial state is produced.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure after the retry budget is exhausted. Fatal to the
    /// current run; checkpoints flushed for completed streams remain valid.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// A response or record failed its expected shape.
    #[error("Data error: {0}")]
    Data(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for tap operations
pub type Result<T> = std::result::Result<T, TapError>;

impl TapError {
    /// Whether checkpoint progress flushed before this error is still usable
    /// for resume. Config errors happen pre-flight, before any flush.
    pub fn preserves_checkpoint(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
