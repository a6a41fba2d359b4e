//! SHA-256 lock identities for target directories

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Number of hex characters kept from the digest
pub const IDENTITY_LEN: usize = 8;

/// Name of the per-tool namespace under the runtime base
pub const LOCK_NAMESPACE: &str = "compress_logs";

/// Name of the lock file inside each identity directory
pub const LOCK_FILE_NAME: &str = "process.lock";

/// Content-addressed identity of a target directory
///
/// Derived from the directory string exactly as given, so repeated runs
/// against the same argument collide on the same lock path.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct LockIdentity(String);

impl LockIdentity {
    /// Derive the identity for a target directory
    pub fn for_dir(target_dir: &str) -> Self {
        let digest = Sha256::digest(target_dir.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(IDENTITY_LEN);
        Self(hex)
    }

    /// Get the identity as a hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory holding the lock file: `<base>/compress_logs/<id>`
    pub fn lock_dir(&self, runtime_base: &Path) -> PathBuf {
        runtime_base.join(LOCK_NAMESPACE).join(&self.0)
    }

    /// Full lock file path: `<base>/compress_logs/<id>/process.lock`
    pub fn lock_file(&self, runtime_base: &Path) -> PathBuf {
        self.lock_dir(runtime_base).join(LOCK_FILE_NAME)
    }
}

impl std::fmt::Debug for LockIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LockIdentity({})", self.0)
    }
}

impl std::fmt::Display for LockIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
