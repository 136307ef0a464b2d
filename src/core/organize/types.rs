//! Types for the organize module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which timestamp decides the `YYYY/Mon` folder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Last modification time
    #[default]
    Modified,
    /// Creation time, falling back to modification time where unsupported
    Created,
}

/// Bounded exponential backoff for locked files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total move attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each further failure
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after failed attempt `attempt` (0-based): base * 2^attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// A completed move
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
    /// The name was taken and a `(n)` suffix was added
    pub renamed: bool,
}

/// Why a file was left where it was
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Directory, symlink, hidden or temporary file
    Ineligible,
    /// Gone before it could be moved
    Vanished,
}

/// Result of organizing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeOutcome {
    Moved(MoveRecord),
    Skipped(SkipReason),
    Failed(String),
}

impl OrganizeOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, OrganizeOutcome::Moved(_))
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Files moved into the category tree
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub records: Vec<MoveRecord>,
    pub duration_ms: u64,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.moved + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn retry_delay_saturates() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(200), Duration::MAX);
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn date_source_defaults_to_modified() {
        assert_eq!(DateSource::default(), DateSource::Modified);
        let json = serde_json::to_string(&DateSource::Created).unwrap();
        assert_eq!(json, "\"created\"");
    }
}
