//! Error types for the player adapter crate

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the adapter surface (configuration, selection)
///
/// Adapter getters and lifecycle hooks never return these; they degrade to
/// default values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid player options
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Options could not be parsed
    #[error("Failed to parse options: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No factory registered under this player kind
    #[error("Unknown player kind: {0}")]
    UnknownPlayer(String),

    /// Selection found neither a capable player nor a fallback
    #[error("No player available for {0}")]
    NoPlayerAvailable(String),

    /// Media URL could not be parsed
    #[error("Invalid media URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
