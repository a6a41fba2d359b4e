//! Retention policy for already-compressed files

use chrono::NaiveDate;
use cl_core::CompressedFileRecord;
use std::collections::BTreeSet;

/// Smallest threshold that enables retention
pub const MIN_KEEP_FILES: usize = 2;

/// Retention policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Number of compressed files to keep
    keep_files: usize,
}

impl RetentionPolicy {
    /// Policy for `keep_files`, or `None` when the threshold is below
    /// [`MIN_KEEP_FILES`] and retention stays off
    pub fn new(keep_files: usize) -> Option<Self> {
        (keep_files >= MIN_KEEP_FILES).then_some(Self { keep_files })
    }

    pub fn keep_files(&self) -> usize {
        self.keep_files
    }
}

/// Outcome of planning a retention pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Records left out of the count because their date was skipped this run
    pub excluded: Vec<CompressedFileRecord>,
    /// Counted records that stay, oldest first
    pub retained: Vec<CompressedFileRecord>,
    /// Counted records to delete, oldest first
    pub delete: Vec<CompressedFileRecord>,
}

/// Plans which compressed files exceed the retention threshold
pub struct Pruner {
    policy: RetentionPolicy,
}

impl Pruner {
    /// Create a new pruner with the given policy
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    /// Split `records` (scan order) into retained and deleted sets
    ///
    /// A record whose date equals the date of a source candidate skipped
    /// this run is not counted. Counted records are ordered by date with
    /// ties kept in scan order, and the oldest beyond `keep_files` go.
    pub fn plan(
        &self,
        records: Vec<CompressedFileRecord>,
        skipped_dates: &BTreeSet<NaiveDate>,
    ) -> RetentionPlan {
        let (excluded, mut counted): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| skipped_dates.contains(&record.date));

        // sort_by_key is stable: equal dates keep scan order
        counted.sort_by_key(|record| record.date);

        let excess = counted.len().saturating_sub(self.policy.keep_files);
        let retained = counted.split_off(excess);

        RetentionPlan {
            excluded,
            retained,
            delete: counted,
        }
    }
}
