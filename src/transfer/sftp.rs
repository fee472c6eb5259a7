//! SFTP batch fetch plus post-transfer remote purge.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use tempfile::NamedTempFile;
use tracing::info;
use uuid::Uuid;

use crate::Result;

use super::run_tool;

/// Hidden probe file written into the remote directory right before the
/// purge. The purge glob skips hidden entries, so the probe survives it.
pub const REMOTE_PROBE_FILE: &str = ".sync-probe";

/// One SFTP session fetches everything under `remote_dir` into `local_dir`;
/// a second SSH session performs the destructive remote cleanup.
#[derive(Debug, Clone)]
pub struct SftpTransfer {
    /// Remote SSH/SFTP endpoint (`user@host` or a configured host alias).
    pub host: String,
    pub remote_dir: String,
    pub local_dir: PathBuf,
    pub ssh_key: PathBuf,
    pub sftp_program: PathBuf,
    pub ssh_program: PathBuf,
}

impl SftpTransfer {
    /// Batch script executed in a single SFTP session. `get -p` preserves
    /// remote timestamps and permissions.
    pub fn batch_script(&self) -> String {
        format!(
            "cd {}\nlcd {}\nget -rp *\nbye\n",
            self.remote_dir,
            self.local_dir.display()
        )
    }

    pub fn fetch_args(&self, batch: &Path) -> Vec<String> {
        vec![
            "-b".into(),
            batch.display().to_string(),
            "-i".into(),
            self.ssh_key.display().to_string(),
            self.host.clone(),
        ]
    }

    /// Remote shell line: write the probe, then delete everything the glob
    /// matches under the remote directory. The glob stays outside the quotes
    /// so the remote shell expands it.
    pub fn purge_command(&self, run_id: Uuid) -> String {
        format!(
            "printf '%s\\n' '{run_id}' > '{dir}/{probe}' && rm -rf '{dir}'/*",
            dir = self.remote_dir,
            probe = REMOTE_PROBE_FILE,
        )
    }

    pub fn purge_args(&self, run_id: Uuid) -> Vec<String> {
        vec![
            "-i".into(),
            self.ssh_key.display().to_string(),
            self.host.clone(),
            self.purge_command(run_id),
        ]
    }

    /// Fetch all entries from the remote directory in one batch session.
    pub fn fetch(&self) -> Result<()> {
        let mut batch = NamedTempFile::new()?;
        batch.write_all(self.batch_script().as_bytes())?;
        batch.flush()?;

        let mut command = Command::new(&self.sftp_program);
        command.args(self.fetch_args(batch.path()));
        run_tool("sftp", &mut command)?;
        info!(host = %self.host, remote = %self.remote_dir, "sftp fetch complete");
        Ok(())
    }

    /// Destructive cleanup of the remote source directory. Unconditional once
    /// reached; nothing verifies the local copy first.
    pub fn purge_remote(&self, run_id: Uuid) -> Result<()> {
        let mut command = Command::new(&self.ssh_program);
        command.args(self.purge_args(run_id));
        run_tool("ssh", &mut command)?;
        info!(host = %self.host, remote = %self.remote_dir, "remote directory purged");
        Ok(())
    }
}
