//! Retry schedule for status polling.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gstsync_core::DomainError;

/// Default waits in milliseconds: a few quick checks, then minutes apart
/// for long-running batch jobs (about 31 minutes end to end).
pub const DEFAULT_SCHEDULE_MS: [u64; 9] = [
    2_000, 3_000, 15_000, 30_000, 60_000, 120_000, 300_000, 600_000, 720_000,
];

/// Ordered waits consulted before each status query.
///
/// Entry `i` is the wait before query `i + 1`; the schedule length is the
/// maximum number of queries a poll may issue. Cloning shares the same
/// backing slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct RetrySchedule(Arc<[Duration]>);

impl RetrySchedule {
    pub fn new(waits: Vec<Duration>) -> Result<Self, DomainError> {
        if waits.is_empty() {
            return Err(DomainError::validation("retry schedule cannot be empty"));
        }
        Ok(Self(waits.into()))
    }

    pub fn from_millis(waits_ms: &[u64]) -> Result<Self, DomainError> {
        Self::new(waits_ms.iter().copied().map(Duration::from_millis).collect())
    }

    /// Parse a comma-separated list of milliseconds (`"2000,3000,15000"`).
    pub fn parse_millis(raw: &str) -> Result<Self, DomainError> {
        let waits = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u64>().map_err(|e| {
                    DomainError::validation(format!("retry schedule entry {part:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_millis(&waits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed schedule.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, attempt: usize) -> Option<Duration> {
        self.0.get(attempt).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        self.0.iter().copied()
    }

    /// Worst-case time spent waiting by one poll.
    pub fn total(&self) -> Duration {
        self.iter().sum()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self(DEFAULT_SCHEDULE_MS.iter().copied().map(Duration::from_millis).collect())
    }
}

impl TryFrom<Vec<u64>> for RetrySchedule {
    type Error = DomainError;

    fn try_from(value: Vec<u64>) -> Result<Self, Self::Error> {
        Self::from_millis(&value)
    }
}

impl From<RetrySchedule> for Vec<u64> {
    fn from(value: RetrySchedule) -> Self {
        value
            .iter()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_matches_constant() {
        let schedule = RetrySchedule::default();
        assert_eq!(schedule.len(), 9);
        assert_eq!(schedule.get(0), Some(Duration::from_secs(2)));
        assert_eq!(schedule.get(8), Some(Duration::from_secs(720)));
        assert_eq!(schedule.get(9), None);
        assert_eq!(schedule.total(), Duration::from_millis(1_850_000));
    }

    #[test]
    fn empty_schedule_is_rejected() {
        assert!(RetrySchedule::new(Vec::new()).is_err());
        assert!(RetrySchedule::parse_millis(" , ").is_err());
    }

    #[test]
    fn parses_comma_separated_millis() {
        let schedule = RetrySchedule::parse_millis("2000, 3000,15000").unwrap();
        assert_eq!(
            schedule.iter().collect::<Vec<_>>(),
            vec![
                Duration::from_millis(2000),
                Duration::from_millis(3000),
                Duration::from_millis(15000)
            ]
        );
        assert!(RetrySchedule::parse_millis("2000,soon").is_err());
    }

    #[test]
    fn clones_share_backing_storage() {
        let a = RetrySchedule::default();
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn serde_uses_millis() {
        let schedule: RetrySchedule = serde_json::from_str("[100, 250]").unwrap();
        assert_eq!(schedule.get(1), Some(Duration::from_millis(250)));
        assert_eq!(serde_json::to_string(&schedule).unwrap(), "[100,250]");
        assert!(serde_json::from_str::<RetrySchedule>("[]").is_err());
    }
}
