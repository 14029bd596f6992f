//! Domain error model.

use thiserror::Error;

/// Result type used across the pure value layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (malformed input, out-of-range
/// values). Remote and transport failures belong to the crates that talk to
/// the server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A return period could not be parsed or is out of range.
    #[error("invalid return period: {0}")]
    InvalidPeriod(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_period(msg: impl Into<String>) -> Self {
        Self::InvalidPeriod(msg.into())
    }
}
