//! Store-side errors.

use opsdesk_core::OpsDeskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Sheets API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected sheet payload: {0}")]
    Decode(String),

    #[error("No sheet id configured for {0}")]
    MissingSheetId(String),
}

impl SheetsError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Connection(e.to_string())
        }
    }
}

impl From<SheetsError> for OpsDeskError {
    fn from(e: SheetsError) -> Self {
        match e {
            SheetsError::Connection(msg) => OpsDeskError::Connection(msg),
            SheetsError::Auth(msg) => OpsDeskError::Auth(msg),
            SheetsError::Timeout(msg) => OpsDeskError::Timeout(msg),
            SheetsError::Http { status, body } => OpsDeskError::Http { status, body },
            other => OpsDeskError::Connection(other.to_string()),
        }
    }
}
