//! Core primitives for compress-logs
//!
//! This crate provides:
//! - Lock identities derived from target directory paths (SHA-256)
//! - Directory snapshots taken in a single listing pass
//! - Dated filename matching with required `year`/`month`/`day` groups

pub mod hash;
pub mod pattern;
pub mod snapshot;

// Re-exports
pub use hash::LockIdentity;
pub use pattern::{
    CompressedFileRecord, CompressedSuffix, DatedFile, FileCandidate, PatternError,
    PatternMatcher, DEFAULT_COMPRESSED_SUFFIX,
};
pub use snapshot::{DirSnapshot, SnapshotError};
