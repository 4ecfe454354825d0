//! Error taxonomy.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpsDeskError>;

#[derive(Debug, Error)]
pub enum OpsDeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store or webhook host unreachable.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Bad or missing credentials. Callers report this as a connection failure.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Missing required local input (empty title, empty selection).
    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpsDeskError {
    /// Whether the failure means the remote side could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Auth(_))
    }
}
