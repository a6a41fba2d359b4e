//! External compressor invocation

use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Default compressor program
pub const DEFAULT_COMPRESSOR: &str = "xz";

/// Default compressor arguments (maximum compression)
pub const DEFAULT_COMPRESSOR_ARGS: &[&str] = &["-9"];

/// Result of compressing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressOutcome {
    Compressed,
    /// Non-zero exit, signal, or spawn failure
    Failed { status: String, stderr: String },
}

/// Compresses a single file in place
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(&self, target_dir: &Path, file_name: &str) -> CompressOutcome;
}

/// Runs `<program> <args...> <dir>/<file>` as a child process
#[derive(Debug, Clone)]
pub struct ProcessCompressor {
    program: String,
    args: Vec<String>,
}

impl ProcessCompressor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Compressor for ProcessCompressor {
    async fn compress(&self, target_dir: &Path, file_name: &str) -> CompressOutcome {
        let path = target_dir.join(file_name);
        tracing::debug!("Running {} {:?} {}", self.program, self.args, path.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => CompressOutcome::Compressed,
            Ok(output) => CompressOutcome::Failed {
                status: describe_status(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => CompressOutcome::Failed {
                status: format!("failed to run {}: {}", self.program, e),
                stderr: String::new(),
            },
        }
    }
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit code {}", code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("terminated by signal {}", signal);
        }
    }

    status.to_string()
}
