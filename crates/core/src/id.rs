//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Local identifier of one polling run.
///
/// Never sent to the server; it only ties together the log lines of a single
/// `check_status` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(Uuid);

impl PollId {
    /// Create a new identifier (UUIDv7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PollId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PollId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PollId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("PollId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Correlation id handed out by the server when a regeneration job starts.
///
/// Opaque: the only rule enforced locally is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceId(String);

impl ReferenceId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("ReferenceId: cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReferenceId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReferenceId> for String {
    fn from(value: ReferenceId) -> Self {
        value.0
    }
}

impl FromStr for ReferenceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_id_is_trimmed() {
        let id = ReferenceId::new("  AB12CD  ").unwrap();
        assert_eq!(id.as_str(), "AB12CD");
    }

    #[test]
    fn reference_id_rejects_blank() {
        assert!(matches!(
            ReferenceId::new("   "),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn reference_id_deserialization_validates() {
        let ok: ReferenceId = serde_json::from_str("\"LAPN24235325555\"").unwrap();
        assert_eq!(ok.as_str(), "LAPN24235325555");

        let err = serde_json::from_str::<ReferenceId>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn poll_ids_are_distinct_and_parse_back() {
        let a = PollId::new();
        let b = PollId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<PollId>().unwrap(), a);
    }
}
