//! Rotation decisions for dated log files
//!
//! This crate provides:
//! - The compress/skip selection over matched candidates
//! - Retention planning for already-compressed files

pub mod retention;
pub mod selection;

// Re-exports
pub use retention::{Pruner, RetentionPlan, RetentionPolicy, MIN_KEEP_FILES};
pub use selection::{select, Selection, SelectionDecision, SelectionPlan, SkipReason};
