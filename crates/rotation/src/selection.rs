//! Compress/skip decisions for matched files

use chrono::NaiveDate;
use cl_core::{CompressedSuffix, DirSnapshot, FileCandidate};
use std::collections::BTreeSet;

/// Why a candidate is left alone this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Dated today, still being written
    Today,
    /// Dated after today
    Future,
    /// Newest file of the set, presumed active
    MostRecent,
    /// A compressed sibling already exists
    AlreadyCompressed,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::Today => "dated today",
            SkipReason::Future => "dated in the future",
            SkipReason::MostRecent => "most recent file",
            SkipReason::AlreadyCompressed => "already compressed",
        }
    }
}

/// Decision for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDecision {
    pub candidate: FileCandidate,
    pub skip_reason: Option<SkipReason>,
}

impl SelectionDecision {
    pub fn skip(&self) -> bool {
        self.skip_reason.is_some()
    }
}

/// Decisions for a candidate set of two or more files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPlan {
    /// Newest candidate date
    pub max_date: NaiveDate,
    /// One decision per candidate, in scan order
    pub decisions: Vec<SelectionDecision>,
}

impl SelectionPlan {
    /// Candidates to hand to the compressor, in scan order
    pub fn to_compress(&self) -> impl Iterator<Item = &FileCandidate> {
        self.decisions
            .iter()
            .filter(|d| !d.skip())
            .map(|d| &d.candidate)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SelectionDecision> {
        self.decisions.iter().filter(|d| d.skip())
    }

    /// Dates of every skipped candidate
    pub fn skipped_dates(&self) -> BTreeSet<NaiveDate> {
        self.skipped().map(|d| d.candidate.date).collect()
    }
}

/// Result of the selection step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No file matched the pattern
    NothingToDo,
    /// A single dated file has nothing to rotate from
    SingleCandidate(FileCandidate),
    /// Two or more candidates were decided
    Decided(SelectionPlan),
}

/// Decide which candidates get compressed
///
/// A candidate is compressed only when it is strictly older than `today`, is
/// not the newest file of the set and has no compressed sibling in
/// `snapshot`.
pub fn select(
    candidates: Vec<FileCandidate>,
    snapshot: &DirSnapshot,
    suffix: &CompressedSuffix,
    today: NaiveDate,
) -> Selection {
    let mut candidates = candidates;
    if candidates.len() <= 1 {
        return match candidates.pop() {
            Some(only) => Selection::SingleCandidate(only),
            None => Selection::NothingToDo,
        };
    }
    let Some(max_date) = candidates.iter().map(|c| c.date).max() else {
        return Selection::NothingToDo;
    };

    let decisions = candidates
        .into_iter()
        .map(|candidate| {
            let skip_reason = skip_reason(&candidate, snapshot, suffix, today, max_date);
            SelectionDecision {
                candidate,
                skip_reason,
            }
        })
        .collect();

    Selection::Decided(SelectionPlan {
        max_date,
        decisions,
    })
}

fn skip_reason(
    candidate: &FileCandidate,
    snapshot: &DirSnapshot,
    suffix: &CompressedSuffix,
    today: NaiveDate,
    max_date: NaiveDate,
) -> Option<SkipReason> {
    if candidate.date == today {
        Some(SkipReason::Today)
    } else if candidate.date > today {
        Some(SkipReason::Future)
    } else if candidate.date == max_date {
        Some(SkipReason::MostRecent)
    } else if suffix.has_counterpart(snapshot, &candidate.name) {
        Some(SkipReason::AlreadyCompressed)
    } else {
        None
    }
}
