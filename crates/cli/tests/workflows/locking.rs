//! Per-directory run lock

use crate::common::LogFixture;
use anyhow::Result;
use cl_core::LockIdentity;
use cli_lib::{LockAttempt, RunLock, EXIT_BUSY};

#[test]
fn test_held_lock_exits_busy_and_touches_nothing() -> Result<()> {
    let fixture = LogFixture::with_files(&[
        "app-2024-01-01.log",
        "app-2024-01-02.log",
        "app-2024-01-03.log",
    ]);

    let held = RunLock::acquire(fixture.runtime(), fixture.path_str())?;
    assert!(matches!(held, LockAttempt::Acquired(_)));

    let result = fixture.rotate().assert_exit(EXIT_BUSY as i32)?;
    assert!(result.contains_stderr("already running"), "{}", result.stderr);
    assert_eq!(
        fixture.files(),
        vec!["app-2024-01-01.log", "app-2024-01-02.log", "app-2024-01-03.log"]
    );

    // Released once the holder goes away
    drop(held);
    fixture.rotate().assert_success()?;
    assert!(fixture.files().contains(&"app-2024-01-01.log.xz".to_string()));

    Ok(())
}

#[test]
fn test_lock_file_layout() -> Result<()> {
    let fixture = LogFixture::with_files(&["app-2024-01-01.log"]);

    fixture.rotate().assert_success()?;

    let identity = LockIdentity::for_dir(fixture.path_str());
    let lock_file = fixture
        .runtime()
        .join("compress_logs")
        .join(identity.as_str())
        .join("process.lock");
    assert!(lock_file.is_file(), "missing {}", lock_file.display());

    Ok(())
}

#[test]
fn test_other_directory_is_not_blocked() -> Result<()> {
    let busy = LogFixture::with_files(&["app-2024-01-01.log", "app-2024-01-02.log"]);
    let free = LogFixture::with_files(&["app-2024-01-01.log", "app-2024-01-02.log"]);

    // Share one runtime dir between both targets
    let _held = RunLock::acquire(free.runtime(), busy.path_str())?;

    free.rotate().assert_success()?;
    assert!(free.files().contains(&"app-2024-01-01.log.xz".to_string()));

    Ok(())
}
