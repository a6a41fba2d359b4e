//! Configuration loading
//!
//! Settings come from an optional TOML file and are overridden by command
//! line flags. The merged [`RunConfig`] is built once and passed by
//! reference to every step of a run.

use crate::compress::{DEFAULT_COMPRESSOR, DEFAULT_COMPRESSOR_ARGS};
use crate::locks::DEFAULT_RUNTIME_DIR;
use anyhow::{Context, Result};
use cl_core::{CompressedSuffix, PatternMatcher, DEFAULT_COMPRESSED_SUFFIX};
use rotation::{RetentionPolicy, MIN_KEEP_FILES};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default console/file log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings file contents
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub rotation: RotationSettings,
    pub compressor: CompressorSettings,
    pub paths: PathSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationSettings {
    pub keep_files: Option<usize>,
    pub compressed_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressorSettings {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMPRESSOR.to_string(),
            args: DEFAULT_COMPRESSOR_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSettings {
    pub runtime_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            runtime_dir: PathBuf::from(DEFAULT_RUNTIME_DIR),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub level: Option<String>,
}

impl Settings {
    /// Load settings
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// read if present, otherwise defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match config_file_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content).context("Failed to parse TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compressor.program.trim().is_empty() {
            anyhow::bail!("compressor.program must not be empty");
        }
        Ok(())
    }
}

/// Per-user config file: `<config_dir>/compress-logs/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("compress-logs").join("config.toml"))
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub keep_files: Option<usize>,
    pub compressed_pattern: Option<String>,
    pub compressor: Option<String>,
    pub compressor_args: Vec<String>,
    pub runtime_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Where and how loudly to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub level: String,
}

impl LogConfig {
    /// Log directory and level; usable before the rest is validated
    pub fn resolve(target_dir: &str, settings: &Settings, overrides: &Overrides) -> Self {
        let dir = overrides
            .log_dir
            .clone()
            .or_else(|| settings.paths.log_dir.clone())
            .unwrap_or_else(|| PathBuf::from(target_dir));
        let level = if overrides.verbose {
            "debug".to_string()
        } else {
            settings
                .log
                .level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
        };
        Self { dir, level }
    }
}

/// Fully validated configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target directory exactly as given; the lock identity hashes this
    pub target_arg: String,
    pub target_dir: PathBuf,
    pub pattern: PatternMatcher,
    /// `pattern` followed by the compressed suffix
    pub compressed_pattern: PatternMatcher,
    pub suffix: CompressedSuffix,
    pub retention: Option<RetentionPolicy>,
    pub compressor_program: String,
    pub compressor_args: Vec<String>,
    pub runtime_dir: PathBuf,
    pub dry_run: bool,
}

impl RunConfig {
    /// Merge settings and overrides, compiling both patterns
    pub fn resolve(
        target_dir: &str,
        pattern: &str,
        settings: &Settings,
        overrides: &Overrides,
    ) -> Result<Self> {
        let suffix_src = overrides
            .compressed_pattern
            .as_deref()
            .or(settings.rotation.compressed_pattern.as_deref())
            .unwrap_or(DEFAULT_COMPRESSED_SUFFIX);

        let pattern = PatternMatcher::new(pattern)?;
        let compressed_pattern = pattern
            .with_suffix(suffix_src)
            .context("Invalid compressed pattern")?;
        let suffix = CompressedSuffix::new(suffix_src).context("Invalid compressed pattern")?;

        let retention = overrides
            .keep_files
            .or(settings.rotation.keep_files)
            .and_then(|keep| {
                let policy = RetentionPolicy::new(keep);
                if policy.is_none() {
                    tracing::warn!(
                        "keep-files {} is below {}, retention disabled",
                        keep,
                        MIN_KEEP_FILES
                    );
                }
                policy
            });

        let compressor_program = overrides
            .compressor
            .clone()
            .unwrap_or_else(|| settings.compressor.program.clone());
        if compressor_program.trim().is_empty() {
            anyhow::bail!("Compressor program must not be empty");
        }
        // Explicit args replace the configured ones as a whole
        let compressor_args = if overrides.compressor_args.is_empty() {
            settings.compressor.args.clone()
        } else {
            overrides.compressor_args.clone()
        };

        let runtime_dir = overrides
            .runtime_dir
            .clone()
            .unwrap_or_else(|| settings.paths.runtime_dir.clone());

        Ok(Self {
            target_arg: target_dir.to_string(),
            target_dir: PathBuf::from(target_dir),
            pattern,
            compressed_pattern,
            suffix,
            retention,
            compressor_program,
            compressor_args,
            runtime_dir,
            dry_run: overrides.dry_run,
        })
    }
}
