//! Incremental rsync-over-SSH transfer with source-side removal.

use std::{path::PathBuf, process::Command};

use tracing::info;

use crate::Result;

use super::run_tool;

/// Vendor metadata directory excluded from transfers (Synology indexer).
pub const VENDOR_METADATA_DIR: &str = "@eaDir";

/// SSH cipher used for the rsync transport.
pub const TRANSPORT_CIPHER: &str = "aes128-ctr";

#[derive(Debug, Clone)]
pub struct RsyncTransfer {
    /// `host:path` style endpoint naming the remote source.
    pub source: String,
    pub local_dir: PathBuf,
    pub ssh_key: PathBuf,
    pub rsync_program: PathBuf,
}

impl RsyncTransfer {
    /// SSH transport: keyed auth, no pty, named cipher, compression and X11
    /// forwarding off.
    pub fn transport(&self) -> String {
        format!(
            "ssh -i {} -T -c {TRANSPORT_CIPHER} -o Compression=no -x",
            self.ssh_key.display()
        )
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-a".into(),
            "--remove-source-files".into(),
            "--exclude=.*".into(),
            format!("--exclude={VENDOR_METADATA_DIR}"),
            "-e".into(),
            self.transport(),
            self.source.clone(),
            self.local_dir.display().to_string(),
        ]
    }

    /// rsync deletes each source file itself after transferring it, so the
    /// remote side empties incrementally with no separate purge step.
    pub fn run(&self) -> Result<()> {
        let mut command = Command::new(&self.rsync_program);
        command.args(self.args());
        run_tool("rsync", &mut command)?;
        info!(source = %self.source, dest = %self.local_dir.display(), "rsync transfer complete");
        Ok(())
    }
}
