//! Compaction Configuration
//!
//! Read once when a [`CompactionManager`](crate::CompactionManager) is
//! constructed; no hot reload. Defaults match a conservative production
//! posture: compaction off unless asked for, weekly checks, and a week of
//! retention for deleted messages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionConfig {
    /// Whether compaction runs at all. When false the manager never starts
    /// a scheduler thread (default: false).
    #[serde(default)]
    pub enabled: bool,

    /// How often each store is checked for compaction eligibility, in hours
    /// (default: 168 — weekly).
    #[serde(default = "default_check_frequency_hours")]
    pub check_frequency_hours: u64,

    /// Minimum used-capacity percentage at which compaction is proposed
    /// (default: 50).
    #[serde(default = "default_min_used_capacity_percentage")]
    pub min_used_capacity_percentage: u64,

    /// How long deleted or expired messages must be retained before they
    /// are eligible for physical removal, in days (default: 7).
    #[serde(default = "default_retention_days")]
    pub deleted_message_retention_days: u64,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_frequency_hours: default_check_frequency_hours(),
            min_used_capacity_percentage: default_min_used_capacity_percentage(),
            deleted_message_retention_days: default_retention_days(),
        }
    }
}

fn default_check_frequency_hours() -> u64 {
    168 // weekly
}

fn default_min_used_capacity_percentage() -> u64 {
    50
}

fn default_retention_days() -> u64 {
    7
}

impl CompactionConfig {
    /// Retention window in milliseconds.
    pub fn retention_time_ms(&self) -> u64 {
        self.deleted_message_retention_days * 24 * 60 * 60 * 1000
    }

    /// Inter-pass wait time in milliseconds.
    pub fn check_frequency_ms(&self) -> u64 {
        self.check_frequency_hours * 60 * 60 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: defaults are the documented values
    #[test]
    fn test_defaults() {
        let config = CompactionConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.check_frequency_hours, 168);
        assert_eq!(config.min_used_capacity_percentage, 50);
        assert_eq!(config.deleted_message_retention_days, 7);
    }

    // Test 2: derived durations
    #[test]
    fn test_derived_durations() {
        let config = CompactionConfig {
            deleted_message_retention_days: 2,
            check_frequency_hours: 3,
            ..CompactionConfig::default()
        };
        assert_eq!(config.retention_time_ms(), 2 * 86_400_000);
        assert_eq!(config.check_frequency_ms(), 3 * 3_600_000);
    }

    // Test 3: missing fields fall back to defaults when deserialized
    #[test]
    fn test_serde_defaults() {
        let config: CompactionConfig = serde_json::from_str("{\"enabled\": true}").unwrap();
        assert!(config.enabled);
        assert_eq!(config.check_frequency_hours, 168);
    }
}
