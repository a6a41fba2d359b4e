//! Argument, pattern and configuration errors

use crate::common::cli::CompressLogsCommand;
use crate::common::{LogFixture, DAILY_PATTERN};
use crate::compress_logs;
use anyhow::Result;

#[test]
fn test_help_exits_zero() -> Result<()> {
    let fixture = LogFixture::new();

    let result = compress_logs!(fixture.path(), "--help").assert_success()?;
    assert!(result.contains_stdout("Usage"), "{}", result.stdout);
    assert!(result.contains_stdout("--keep-files"));

    Ok(())
}

#[test]
fn test_missing_arguments_exit_one() -> Result<()> {
    let fixture = LogFixture::new();
    compress_logs!(fixture.path(), fixture.path_str()).assert_exit(1)?;
    compress_logs!(fixture.path(), "--no-such-flag").assert_exit(1)?;
    Ok(())
}

#[test]
fn test_pattern_without_day_group_is_fatal() -> Result<()> {
    let fixture = LogFixture::with_files(&["app-2024-01-01.log", "app-2024-01-02.log"]);

    let result = fixture
        .command(r"app-(?P<year>\d{4})-(?P<month>\d{2})-\d{2}\.log", "exit 0")
        .assert_exit(1)?;
    assert!(result.contains_stderr("missing named group"), "{}", result.stderr);
    assert_eq!(fixture.files(), vec!["app-2024-01-01.log", "app-2024-01-02.log"]);

    Ok(())
}

#[test]
fn test_uncompilable_pattern_is_fatal() -> Result<()> {
    let fixture = LogFixture::with_files(&["app-2024-01-01.log"]);
    fixture.command("app-(?P<year>", "exit 0").assert_exit(1)?;
    Ok(())
}

#[test]
fn test_missing_capture_aborts_and_records_exception() -> Result<()> {
    let fixture = LogFixture::with_files(&[
        "app-2024-01-01.log",
        "app-2024-01-02.log",
        "app-2024-01.log",
    ]);

    let result = fixture
        .command(
            r"app-(?P<year>\d{4})-(?P<month>\d{2})(?:-(?P<day>\d{2}))?\.log",
            crate::common::RENAME_TO_XZ,
        )
        .assert_exit(1)?;
    assert!(result.contains_stderr("did not capture"), "{}", result.stderr);
    // Nothing was compressed
    assert_eq!(
        fixture.files(),
        vec!["app-2024-01-01.log", "app-2024-01-02.log", "app-2024-01.log"]
    );

    let exceptions = std::fs::read_to_string(fixture.exception_log())?;
    assert!(exceptions.contains("ERROR"), "{exceptions}");
    assert!(exceptions.contains("did not capture"));

    Ok(())
}

#[test]
fn test_invalid_date_is_fatal() -> Result<()> {
    let fixture = LogFixture::with_files(&["app-2024-02-30.log", "app-2024-03-01.log"]);

    let result = fixture.rotate().assert_exit(1)?;
    assert!(result.contains_stderr("invalid date"), "{}", result.stderr);

    Ok(())
}

#[test]
fn test_missing_directory_is_fatal() -> Result<()> {
    let fixture = LogFixture::new();
    let missing = fixture.path().join("gone");
    let runtime = fixture.runtime().to_str().unwrap_or_default().to_string();

    let mut cmd = CompressLogsCommand::new(fixture.path());
    cmd.args(&[
        missing.to_str().unwrap_or_default(),
        DAILY_PATTERN,
        "--runtime-dir",
        &runtime,
    ]);
    let result = cmd.assert_exit(1)?;
    assert!(result.contains_stderr("does not exist"), "{}", result.stderr);

    Ok(())
}

#[test]
fn test_config_file_supplies_settings() -> Result<()> {
    let fixture = LogFixture::with_files(&[
        "app-2024-01-01.log.xz",
        "app-2024-01-02.log.xz",
        "app-2024-01-03.log",
        "app-2024-01-04.log",
    ]);
    let config_path = fixture.logs().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[rotation]\nkeep_files = 2\n\n[compressor]\nprogram = \"sh\"\nargs = [\"-c\", '{}', \"sh\"]\n\n[paths]\nruntime_dir = \"{}\"\nlog_dir = \"{}\"\n",
            crate::common::RENAME_TO_XZ,
            fixture.runtime().display(),
            fixture.logs().display(),
        ),
    )?;

    let mut cmd = CompressLogsCommand::new(fixture.path());
    cmd.args(&[
        fixture.path_str(),
        DAILY_PATTERN,
        "--config",
        config_path.to_str().unwrap_or_default(),
    ]);
    cmd.assert_success()?;

    assert_eq!(
        fixture.files(),
        vec!["app-2024-01-02.log.xz", "app-2024-01-03.log.xz", "app-2024-01-04.log"]
    );

    Ok(())
}

#[test]
fn test_missing_config_file_is_fatal() -> Result<()> {
    let fixture = LogFixture::with_files(&["app-2024-01-01.log"]);
    let missing = fixture.logs().join("nope.toml");

    fixture
        .rotate()
        .args(&["--config", missing.to_str().unwrap_or_default()])
        .assert_exit(1)?;

    Ok(())
}
