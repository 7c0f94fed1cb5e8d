use thiserror::Error;

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Failures that abort a history lookup.
///
/// Malformed index rows and empty result sets are not errors: the former are
/// skipped during normalization and the latter come back as an empty list.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The index service could not be reached or the transfer broke off
    #[error("request to the archive index failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The index answered, but not with something we can read as CDX rows
    #[error("unexpected response from the archive index: {message}")]
    Protocol { message: String },

    /// A response body or a capture timestamp could not be decoded
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl HistoryError {
    pub fn protocol(message: impl Into<String>) -> Self {
        HistoryError::Protocol {
            message: message.into(),
        }
    }

    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        HistoryError::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }
}
