//! Termination-signal handling: the lock file must be gone once the process
//! has fully exited, whatever the marker state.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pullbox::transfer::TRANSFER_MARKER;
use tempfile::tempdir;

fn write_blocking_stub(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nsleep 30\n").unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn wait_for(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if cond() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("timed out waiting for {what}");
}

#[test]
fn sigterm_mid_transfer_removes_lock_file() {
    let local = tempdir().unwrap();
    let bin = tempdir().unwrap();
    let tmp = tempdir().unwrap();
    let lock_path = tmp.path().join("pullbox.lock");
    let stub = write_blocking_stub(bin.path(), "rsync");

    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_pullbox"))
        .args([
            "rsync",
            "seedbox:/incoming/",
            local.path().to_str().unwrap(),
            "/keys/id",
            "--lock-file",
            lock_path.to_str().unwrap(),
            "--rsync-program",
            stub.to_str().unwrap(),
        ])
        .spawn()
        .unwrap();

    // The transfer stub blocks, so lock and marker appear and stay.
    wait_for("lock file", || lock_path.exists());
    wait_for("transfer marker", || {
        local.path().join(TRANSFER_MARKER).exists()
    });

    let rc = unsafe { libc::kill(child.id() as i32, libc::SIGTERM) };
    assert_eq!(0, rc);

    let status = child.wait().unwrap();
    assert!(!status.success());

    wait_for("lock cleanup", || !lock_path.exists());
    // Only the lock is guaranteed consistent; the marker documents the
    // interrupted transfer.
    assert!(local.path().join(TRANSFER_MARKER).exists());
}

#[test]
fn sigint_before_transfer_completes_also_removes_lock_file() {
    let local = tempdir().unwrap();
    let bin = tempdir().unwrap();
    let tmp = tempdir().unwrap();
    let lock_path = tmp.path().join("pullbox.lock");
    let stub = write_blocking_stub(bin.path(), "sftp");

    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_pullbox"))
        .args([
            "sftp",
            "seedbox",
            "/incoming",
            local.path().to_str().unwrap(),
            "/keys/id",
            "--lock-file",
            lock_path.to_str().unwrap(),
            "--sftp-program",
            stub.to_str().unwrap(),
        ])
        .spawn()
        .unwrap();

    wait_for("lock file", || lock_path.exists());
    wait_for("transfer marker", || {
        local.path().join(TRANSFER_MARKER).exists()
    });

    let rc = unsafe { libc::kill(child.id() as i32, libc::SIGINT) };
    assert_eq!(0, rc);

    let status = child.wait().unwrap();
    assert!(!status.success());

    wait_for("lock cleanup", || !lock_path.exists());
}
