//! Index health status and per-operation execution options.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cluster health status of an index, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Red,
    Yellow,
    Green,
}

impl IndexStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStatus::Red => "red",
            IndexStatus::Yellow => "yellow",
            IndexStatus::Green => "green",
        }
    }

    /// Whether an index in status `actual` satisfies this requirement
    pub fn is_satisfied_by(&self, actual: IndexStatus) -> bool {
        actual >= *self
    }
}

impl std::fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(IndexStatus::Red),
            "yellow" => Ok(IndexStatus::Yellow),
            "green" => Ok(IndexStatus::Green),
            other => Err(format!(
                "invalid index status '{}', expected one of: green, yellow, red",
                other
            )),
        }
    }
}

/// Options shared by every lifecycle operation on an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub required_status: IndexStatus,
    pub required_status_timeout_ms: u64,
}

impl ExecutionOptions {
    pub fn new(required_status: IndexStatus, required_status_timeout_ms: u64) -> Self {
        Self {
            required_status,
            required_status_timeout_ms,
        }
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self::new(IndexStatus::Yellow, 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(IndexStatus::Yellow.is_satisfied_by(IndexStatus::Green));
        assert!(IndexStatus::Yellow.is_satisfied_by(IndexStatus::Yellow));
        assert!(!IndexStatus::Yellow.is_satisfied_by(IndexStatus::Red));
        assert!(IndexStatus::Red.is_satisfied_by(IndexStatus::Red));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("GREEN".parse::<IndexStatus>(), Ok(IndexStatus::Green));
        assert_eq!(" yellow ".parse::<IndexStatus>(), Ok(IndexStatus::Yellow));
        assert!("blue".parse::<IndexStatus>().is_err());
    }
}
