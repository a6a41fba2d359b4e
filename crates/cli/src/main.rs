//! compress-logs - compress and prune dated log files

use clap::Parser;
use cli_lib::config::{LogConfig, Overrides, RunConfig, Settings};
use cli_lib::logging;
use cli_lib::{execute, Outcome, ProcessCompressor, EXIT_FATAL};
use std::path::PathBuf;
use std::process::ExitCode;

/// Compress dated log files, keeping the newest uncompressed
#[derive(Parser)]
#[command(name = "compress-logs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the log files
    directory: String,

    /// Regex with named groups year, month and day (case-insensitive)
    pattern: String,

    /// Keep this many compressed files, deleting older ones (below 2 disables)
    #[arg(short = 'k', long)]
    keep_files: Option<usize>,

    /// Suffix regex appended to PATTERN to match compressed files [default: \.xz$]
    #[arg(short = 'c', long)]
    compressed_pattern: Option<String>,

    /// Log what would be done without touching any file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Compressor program [default: xz]
    #[arg(long)]
    compressor: Option<String>,

    /// Compressor argument, repeatable [default: -9]
    #[arg(long = "compressor-arg", allow_hyphen_values = true)]
    compressor_args: Vec<String>,

    /// Base directory for lock files [default: /run]
    #[arg(long)]
    runtime_dir: Option<PathBuf>,

    /// Directory for compress_logs.log and exceptions.log [default: DIRECTORY]
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            keep_files: self.keep_files,
            compressed_pattern: self.compressed_pattern.clone(),
            compressor: self.compressor.clone(),
            compressor_args: self.compressor_args.clone(),
            runtime_dir: self.runtime_dir.clone(),
            log_dir: self.log_dir.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FATAL)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let overrides = cli.overrides();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // No subscriber yet
            eprintln!("FATAL ERROR: {:#}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let log_config = LogConfig::resolve(&cli.directory, &settings, &overrides);
    let _guard = logging::init(&log_config.dir, &log_config.level);

    let result = match RunConfig::resolve(&cli.directory, &cli.pattern, &settings, &overrides) {
        Ok(config) => {
            tracing::debug!(
                "Rotating {} with /{}/ (compressed /{}/)",
                config.target_dir.display(),
                config.pattern.as_str(),
                config.compressed_pattern.as_str()
            );
            let compressor = ProcessCompressor::new(
                config.compressor_program.clone(),
                config.compressor_args.clone(),
            );
            let today = chrono::Local::now().date_naive();
            execute(&config, &compressor, today).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            if let Outcome::Completed(report) = &outcome {
                report.print();
            }
            outcome.exit_code()
        }
        Err(e) => {
            // Also lands in exceptions.log
            tracing::error!("FATAL ERROR: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
