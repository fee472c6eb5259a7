//! Transfer-marker handling and external transfer invocations.
//!
//! The actual transfer semantics belong to the external clients; this module
//! only builds their invocations and tracks the in-flight sentinel.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result};

pub mod rsync;
pub mod sftp;

/// Sentinel file signaling an in-flight transfer to external observers.
pub const TRANSFER_MARKER: &str = ".transferring";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkerRecord {
    pub run_id: Uuid,
    pub pid: u32,
    pub started_epoch_secs: u64,
}

/// Present between transfer start and completion. A failed run leaves the
/// marker behind as the signal of an incomplete transfer; there is
/// intentionally no removal on drop.
#[derive(Debug)]
pub struct TransferMarker {
    path: PathBuf,
    pub run_id: Uuid,
}

impl TransferMarker {
    pub fn create(local_dir: &Path) -> Result<Self> {
        if !local_dir.is_dir() {
            return Err(Error::InvalidLocalDir(local_dir.display().to_string()).into());
        }
        if !is_writable(local_dir) {
            return Err(Error::LocalDirNotWritable(local_dir.display().to_string()).into());
        }

        let run_id = Uuid::new_v4();
        let record = MarkerRecord {
            run_id,
            pid: std::process::id(),
            started_epoch_secs: now_secs(),
        };
        let path = local_dir.join(TRANSFER_MARKER);
        let data = serde_json::to_vec_pretty(&record).map_err(Error::from)?;
        fs::write(&path, data)?;
        info!(marker = %path.display(), %run_id, "transfer marker created");
        Ok(Self { path, run_id })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Success-path removal.
    pub fn complete(self) -> Result<()> {
        fs::remove_file(&self.path)?;
        info!(marker = %self.path.display(), "transfer marker removed");
        Ok(())
    }
}

/// Run an external tool to completion, inheriting stdio so its progress
/// output reaches the operator.
pub(crate) fn run_tool(tool: &str, command: &mut Command) -> Result<()> {
    info!(tool, ?command, "invoking external tool");
    let status = command.status().map_err(|source| Error::ToolUnavailable {
        tool: tool.to_string(),
        source,
    })?;
    if !status.success() {
        return Err(Error::TransferFailed {
            tool: tool.to_string(),
            status,
        }
        .into());
    }
    Ok(())
}

fn is_writable(path: &Path) -> bool {
    let test_file = path.join(".pullbox_write_test");
    match fs::write(&test_file, b"pullbox") {
        Ok(_) => fs::remove_file(test_file).is_ok(),
        Err(_) => false,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
