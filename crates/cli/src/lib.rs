//! compress-logs library: configuration, locking and the rotation run

pub mod compress;
pub mod config;
pub mod locks;
pub mod logging;
pub mod report;
pub mod run;

pub use compress::{CompressOutcome, Compressor, ProcessCompressor};
pub use config::{LogConfig, Overrides, RunConfig, Settings};
pub use locks::{LockAttempt, RunLock};
pub use report::RunReport;
pub use run::{execute, Outcome, EXIT_BUSY, EXIT_FATAL};
