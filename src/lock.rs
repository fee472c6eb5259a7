//! Single-instance guard: an exclusive, non-blocking advisory lock on a
//! well-known lock-file path, released on every exit path.

use std::{
    ffi::CString,
    fs::{File, OpenOptions},
    io::{self, Write},
    os::unix::ffi::OsStrExt,
    os::unix::io::AsRawFd,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Contents of the lock file. Written for operator visibility only; the tool
/// never reads it back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockRecord {
    pub pid: u32,
    pub acquired_epoch_secs: u64,
}

/// Default lock path: `<temp dir>/<executable name>.lock`.
pub fn default_lock_path() -> PathBuf {
    let name = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    std::env::temp_dir().join(format!("{name}.lock"))
}

/// Holds the exclusive `flock` for the lifetime of a run. Dropping the guard
/// removes the lock file; `install_signal_cleanup` extends the same guarantee
/// to INT/QUIT/TERM.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
    released: bool,
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        // No truncate here: the file may belong to a live holder.
        let file = OpenOptions::new().create(true).write(true).open(path)?;

        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                return Err(Error::AlreadyRunning(path.display().to_string()).into());
            }
            return Err(Error::Io(err).into());
        }

        let lock = Self {
            file,
            path: path.to_path_buf(),
            released: false,
        };
        // Best-effort: the record is diagnostic, the flock is the lock.
        if let Err(err) = lock.write_record() {
            warn!(lock = %lock.path.display(), %err, "failed to record holder pid");
        }
        info!(lock = %lock.path.display(), "instance lock acquired");
        Ok(lock)
    }

    fn write_record(&self) -> Result<()> {
        let record = LockRecord {
            pid: std::process::id(),
            acquired_epoch_secs: now_secs(),
        };
        let data = serde_json::to_vec_pretty(&record).map_err(Error::from)?;
        self.file.set_len(0)?;
        (&self.file).write_all(&data)?;
        (&self.file).flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register INT/QUIT/TERM handlers that unlink the lock file and re-raise
    /// the signal with default disposition.
    pub fn install_signal_cleanup(&self) -> Result<()> {
        register_signal_cleanup(&self.path)
    }

    /// Explicit release; also performed on drop.
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = std::fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), %err, "failed to remove lock file");
        }
        // Closing the fd releases the flock itself.
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.do_release();
    }
}

static CLEANUP_PATH: OnceLock<CString> = OnceLock::new();

// Async-signal-safe: only unlink(2), signal(2) and raise(3) run here.
extern "C" fn on_termination(signal: libc::c_int) {
    if let Some(path) = CLEANUP_PATH.get() {
        unsafe {
            libc::unlink(path.as_ptr());
        }
    }
    unsafe {
        libc::signal(signal, libc::SIG_DFL);
        libc::raise(signal);
    }
}

fn register_signal_cleanup(path: &Path) -> Result<()> {
    let cpath = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| Error::Cli(format!("lock path contains NUL: {}", path.display())))?;
    // First registration wins; a process holds at most one instance lock.
    let _ = CLEANUP_PATH.set(cpath);

    let handler = on_termination as extern "C" fn(libc::c_int);
    for sig in [libc::SIGINT, libc::SIGQUIT, libc::SIGTERM] {
        let prev = unsafe { libc::signal(sig, handler as libc::sighandler_t) };
        if prev == libc::SIG_ERR {
            return Err(Error::Io(io::Error::last_os_error()).into());
        }
    }
    Ok(())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
