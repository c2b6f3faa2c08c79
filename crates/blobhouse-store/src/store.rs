//! Store Collaborator Contract
//!
//! The compaction scheduler never parses records itself. It talks to each
//! store through this trait: size and capacity for the eligibility check,
//! the list of log segments outside the journal for the candidate set, and
//! the resume/compact entry points. The store owns file handles, the index,
//! and the journal (the in-memory recency window over recent writes); all
//! of that stays behind this boundary.

use crate::error::Result;

/// One managed blob store, typically one replica directory on a mount
/// point. Implementations are responsible for their own internal locking
/// between active writers and an in-progress compaction.
pub trait BlobStore: Send + Sync {
    /// Identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Whether the store is started and serving.
    fn is_started(&self) -> bool;

    /// Bytes currently used by the store's log.
    fn size_in_bytes(&self) -> u64;

    /// Total capacity of the store's log.
    fn capacity_in_bytes(&self) -> u64;

    /// Names of log segments not covered by the journal, in log order.
    /// `None` or an empty list means nothing is eligible: segments inside
    /// the journal's window may still back fast recent-write lookups and
    /// are excluded outright.
    fn log_segments_not_in_journal(&self) -> Option<Vec<String>>;

    /// Resume a compaction left incomplete by a previous run. Idempotent;
    /// safe to call when nothing was pending.
    fn maybe_resume_compaction(&self) -> Result<()>;

    /// Compact the described segments, rewriting live data and dropping
    /// deleted/expired records older than the reference time.
    fn compact(&self, details: CompactionDetails) -> Result<()>;
}

/// Description of one compaction job, produced by the scheduler each
/// decision cycle and consumed immediately by the store. Never persisted
/// here; the store layer owns any durable compaction progress marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionDetails {
    reference_time_ms: u64,
    log_segments: Vec<String>,
}

impl CompactionDetails {
    pub fn new(reference_time_ms: u64, log_segments: Vec<String>) -> Self {
        Self {
            reference_time_ms,
            log_segments,
        }
    }

    /// Cutoff timestamp: records consisting solely of deleted/expired data
    /// older than this point are eligible for physical removal.
    pub fn reference_time_ms(&self) -> u64 {
        self.reference_time_ms
    }

    /// Ordered names of the log segments to compact.
    pub fn log_segments(&self) -> &[String] {
        &self.log_segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: details preserve segment order
    #[test]
    fn test_details_preserve_order() {
        let segments = vec!["0_1".to_string(), "0_2".to_string(), "0_3".to_string()];
        let details = CompactionDetails::new(1_700_000_000_000, segments.clone());
        assert_eq!(details.reference_time_ms(), 1_700_000_000_000);
        assert_eq!(details.log_segments(), &segments[..]);
    }
}
