//! Point-in-time listing of a target directory

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while listing a directory
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Directory \"{0}\" does not exist")]
    Missing(PathBuf),

    #[error("\"{0}\" is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sorted file names of one directory, taken in a single pass
///
/// Name order is the scan order used everywhere downstream, so decisions
/// and retention tie-breaks do not depend on `read_dir` ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirSnapshot {
    names: Vec<String>,
}

impl DirSnapshot {
    /// List regular files in `dir`
    ///
    /// Subdirectories are left out. Names that are not valid UTF-8 cannot be
    /// matched by a pattern and are skipped.
    pub fn capture(dir: &Path) -> Result<Self, SnapshotError> {
        ensure_directory(dir)?;

        let io_err = |source| SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::debug!("Skipping non UTF-8 file name {:?}", raw),
            }
        }

        Ok(Self::from_names(names))
    }

    /// Build a snapshot from known names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Names in scan order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Drop every name for which `skip` returns true
    pub fn excluding(mut self, skip: impl Fn(&str) -> bool) -> Self {
        self.names.retain(|name| !skip(name));
        self
    }
}

/// Check that `dir` exists and is a directory
pub fn ensure_directory(dir: &Path) -> Result<(), SnapshotError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SnapshotError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SnapshotError::Missing(dir.to_path_buf()))
        }
        Err(source) => Err(SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
