//! Logging setup
//!
//! Console output goes to stderr. A daily-rotated copy is written to
//! `<log_dir>/compress_logs.log.YYYY-MM-DD`, and error events (fatal errors
//! and panics) also go to `<log_dir>/exceptions.log`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{Filtered, LevelFilter};
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Prefix of the rolling application log
pub const LOG_FILE_PREFIX: &str = "compress_logs.log";

/// Error-only log file name
pub const EXCEPTION_LOG: &str = "exceptions.log";

type ExceptionLayer<S> = Filtered<
    tracing_subscriber::fmt::Layer<S, DefaultFields, Format, RollingFileAppender>,
    LevelFilter,
    S,
>;

/// Keeps the background log writer alive; drop it to flush
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Whether `name` is one of the files this tool logs to
pub fn is_log_file(name: &str) -> bool {
    name.starts_with(LOG_FILE_PREFIX) || name == EXCEPTION_LOG
}

/// Install the global subscriber and the panic hook
///
/// `RUST_LOG` takes precedence over `level`. If the log directory cannot be
/// used, logging continues on stderr only.
pub fn init(log_dir: &Path, level: &str) -> LogGuard {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_LEVEL));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard, file_error) = match rolling_appender(log_dir) {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    // Written synchronously so a panic line lands before the process dies
    let exception_layer = exception_appender(log_dir).ok().map(exception_layer);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .with(exception_layer)
        .try_init();

    if let Some(e) = file_error {
        tracing::warn!("File logging disabled ({}): {}", log_dir.display(), e);
    }

    install_panic_hook();

    LogGuard { _file: guard }
}

/// Daily rolling appender in an existing `log_dir`
pub fn rolling_appender(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
    ensure_log_dir(log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)?;
    Ok(appender)
}

/// Non-rotating `exceptions.log` appender in an existing `log_dir`
pub fn exception_appender(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
    ensure_log_dir(log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(EXCEPTION_LOG)
        .build(log_dir)?;
    Ok(appender)
}

fn exception_layer<S>(appender: RollingFileAppender) -> ExceptionLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::ERROR)
}

// The appender builder creates missing directories; only log into existing ones
fn ensure_log_dir(log_dir: &Path) -> anyhow::Result<()> {
    if !log_dir.is_dir() {
        anyhow::bail!("not a directory");
    }
    Ok(())
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("panic: {}", info);
        previous(info);
    }));
}
