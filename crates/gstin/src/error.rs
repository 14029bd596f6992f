use gstsync_core::DomainError;
use thiserror::Error;

/// Why an identifier was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GstinError {
    #[error("expected {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unknown state code {0:?}")]
    InvalidStateCode(String),

    #[error("check digit mismatch (expected {expected}, found {found})")]
    ChecksumMismatch { expected: char, found: char },
}

impl From<GstinError> for DomainError {
    fn from(value: GstinError) -> Self {
        DomainError::validation(value.to_string())
    }
}
