//! One rotation run: lock, select, compress, prune

use crate::compress::{CompressOutcome, Compressor};
use crate::config::RunConfig;
use crate::locks::{LockAttempt, RunLock};
use crate::logging::is_log_file;
use crate::report::RunReport;
use anyhow::Result;
use chrono::NaiveDate;
use cl_core::snapshot::ensure_directory;
use cl_core::{CompressedFileRecord, DirSnapshot};
use rotation::{select, Pruner, RetentionPolicy, Selection, SelectionPlan};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

/// Exit code for fatal configuration and system errors
pub const EXIT_FATAL: u8 = 1;

/// Exit code when another run holds the lock for the directory
pub const EXIT_BUSY: u8 = 10;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Another process is rotating this directory
    Busy,
    /// No file matched the pattern
    NothingToDo,
    /// Only one dated file, nothing to rotate from
    SingleCandidate,
    /// Selection ran; per-file failures are in the report
    Completed(RunReport),
}

impl Outcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Outcome::Busy => ExitCode::from(EXIT_BUSY),
            _ => ExitCode::SUCCESS,
        }
    }
}

/// Execute a run against `config.target_dir`
///
/// Errors returned here are fatal. Per-file compression and deletion
/// failures are logged and counted instead.
pub async fn execute(
    config: &RunConfig,
    compressor: &dyn Compressor,
    today: NaiveDate,
) -> Result<Outcome> {
    ensure_directory(&config.target_dir)?;

    // Held until this function returns; the kernel releases it at exit anyway
    let _lock = match RunLock::acquire(&config.runtime_dir, &config.target_arg)? {
        LockAttempt::Acquired(lock) => {
            debug!("Lock acquired: {} ({})", lock.path().display(), lock.identity());
            lock
        }
        LockAttempt::Busy { path } => {
            warn!(
                "Another instance is already running for \"{}\" (lock {})",
                config.target_arg,
                path.display()
            );
            return Ok(Outcome::Busy);
        }
    };

    let snapshot = capture(config)?;
    let candidates = config
        .pattern
        .match_snapshot(&snapshot, Some(&config.compressed_pattern))?;
    if config.retention.is_some() {
        // Surface compressed-pattern errors before anything is touched
        config.compressed_pattern.match_snapshot(&snapshot, None)?;
    }

    let plan = match select(candidates, &snapshot, &config.suffix, today) {
        Selection::NothingToDo => {
            warn!("No files found to compress");
            return Ok(Outcome::NothingToDo);
        }
        Selection::SingleCandidate(only) => {
            info!("Only one dated file (\"{}\"), nothing to rotate", only.name);
            return Ok(Outcome::SingleCandidate);
        }
        Selection::Decided(plan) => plan,
    };

    let mut report = RunReport::new(config.dry_run);
    compress_selected(config, compressor, &plan, &mut report).await;

    if let Some(policy) = config.retention {
        apply_retention(config, policy, &plan, &mut report).await?;
    }

    Ok(Outcome::Completed(report))
}

/// Directory listing without this tool's own log files
fn capture(config: &RunConfig) -> Result<DirSnapshot> {
    Ok(DirSnapshot::capture(&config.target_dir)?.excluding(is_log_file))
}

async fn compress_selected(
    config: &RunConfig,
    compressor: &dyn Compressor,
    plan: &SelectionPlan,
    report: &mut RunReport,
) {
    for decision in plan.skipped() {
        if let Some(reason) = decision.skip_reason {
            debug!("Skipping \"{}\": {}", decision.candidate.name, reason.describe());
        }
        report.skipped += 1;
    }

    for candidate in plan.to_compress() {
        let path = config.target_dir.join(&candidate.name);

        if config.dry_run {
            info!("[dry-run] Would compress \"{}\"", path.display());
            report.compressed += 1;
            continue;
        }

        info!("Compressing \"{}\"", path.display());
        match compressor.compress(&config.target_dir, &candidate.name).await {
            CompressOutcome::Compressed => report.compressed += 1,
            CompressOutcome::Failed { status, stderr } => {
                error!("Failed to compress file: \"{}\" ({})", path.display(), status);
                if !stderr.is_empty() {
                    error!("stderr: {}", stderr);
                }
                report.compress_failed += 1;
            }
        }
    }
}

async fn apply_retention(
    config: &RunConfig,
    policy: RetentionPolicy,
    plan: &SelectionPlan,
    report: &mut RunReport,
) -> Result<()> {
    // Fresh listing so files compressed above are counted
    let snapshot = capture(config)?;
    let records = config.compressed_pattern.match_snapshot(&snapshot, None)?;
    let retention = Pruner::new(policy).plan(records, &plan.skipped_dates());

    for record in &retention.excluded {
        debug!("Not counting \"{}\" toward retention", record.name);
    }
    debug!(
        "Retention: {} counted, keeping {}, deleting {}",
        retention.retained.len() + retention.delete.len(),
        policy.keep_files(),
        retention.delete.len()
    );

    delete_records(config, &retention.delete, report).await;

    Ok(())
}

/// Delete `records` oldest first; a failure is logged and the rest still go
async fn delete_records(
    config: &RunConfig,
    records: &[CompressedFileRecord],
    report: &mut RunReport,
) {
    for record in records {
        let path = config.target_dir.join(&record.name);

        if config.dry_run {
            info!("[dry-run] Would delete \"{}\"", path.display());
            report.deleted += 1;
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted \"{}\"", path.display());
                report.deleted += 1;
            }
            Err(e) => {
                error!("Failed to delete file: \"{}\": {}", path.display(), e);
                report.delete_failed += 1;
            }
        }
    }
}
