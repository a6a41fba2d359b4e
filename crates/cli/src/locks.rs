//! Per-directory run lock
//!
//! One lock file per target directory, at
//! `<runtime>/compress_logs/<sha256(dir)[..8]>/process.lock`. The lock is an
//! exclusive non-blocking `flock` that the kernel drops when the process
//! exits; there is no unlock step.

use anyhow::{Context, Result};
use cl_core::LockIdentity;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Default base directory for lock directories
pub const DEFAULT_RUNTIME_DIR: &str = "/run";

/// Held run lock
pub struct RunLock {
    identity: LockIdentity,
    path: PathBuf,
    #[allow(dead_code)]
    file: File,
}

/// Result of a single lock attempt
pub enum LockAttempt {
    /// Lock acquired; keep the guard alive for the whole run
    Acquired(RunLock),
    /// Another process holds the lock for this directory
    Busy { path: PathBuf },
}

impl RunLock {
    /// Try once to take the lock for `target_dir`
    ///
    /// Returns `Busy` if another process holds it. Any other failure
    /// (permissions, unexpected errno) is an error.
    pub fn acquire(runtime_dir: &Path, target_dir: &str) -> Result<LockAttempt> {
        let identity = LockIdentity::for_dir(target_dir);
        let lock_dir = identity.lock_dir(runtime_dir);
        let lock_path = identity.lock_file(runtime_dir);

        if !lock_dir.is_dir() {
            tracing::info!("Creating directory: \"{}\"", lock_dir.display());
        }
        std::fs::create_dir_all(&lock_dir)
            .with_context(|| format!("Failed to create lock directory {}", lock_dir.display()))?;

        let file = open_lock_file(&lock_path)
            .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

        if !try_flock_exclusive(&file)
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?
        {
            return Ok(LockAttempt::Busy { path: lock_path });
        }

        Ok(LockAttempt::Acquired(Self {
            identity,
            path: lock_path,
            file,
        }))
    }

    pub fn identity(&self) -> &LockIdentity {
        &self.identity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open read-only when the file exists; create it only when absent
///
/// `flock` needs no write access, so a lock file left by another user
/// is still usable.
fn open_lock_file(path: &Path) -> std::io::Result<File> {
    match File::open(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path),
        other => other,
    }
}

/// Try to acquire exclusive file lock (non-blocking)
#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(_) => Ok(true),
        // EAGAIN and EWOULDBLOCK share a value on Linux
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> Result<bool> {
    anyhow::bail!("Advisory file locks are only supported on Unix")
}
