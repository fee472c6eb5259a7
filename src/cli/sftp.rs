//! Implementation of `pullbox sftp`.

use std::path::PathBuf;

use clap::Args;
use tracing::{info, instrument};

use crate::{
    lock::{self, InstanceLock},
    transfer::{sftp::SftpTransfer, TransferMarker},
    Result,
};

#[derive(Debug, Clone, Args)]
pub struct SftpArgs {
    /// Remote SSH/SFTP endpoint (user@host or a configured host alias)
    pub host: String,

    /// Remote directory to fetch and purge
    pub remote_dir: String,

    /// Local target directory
    pub local_dir: PathBuf,

    /// SSH private key used by the external clients
    pub ssh_key: PathBuf,

    /// Lock file path; defaults to <temp dir>/<tool name>.lock
    #[arg(long = "lock-file")]
    pub lock_file: Option<PathBuf>,

    /// Override the sftp executable
    #[arg(long = "sftp-program", default_value = "sftp")]
    pub sftp_program: PathBuf,

    /// Override the ssh executable
    #[arg(long = "ssh-program", default_value = "ssh")]
    pub ssh_program: PathBuf,
}

pub fn execute(args: SftpArgs) -> Result<()> {
    let lock_path = args
        .lock_file
        .clone()
        .unwrap_or_else(lock::default_lock_path);
    let lock = InstanceLock::acquire(&lock_path)?;
    lock.install_signal_cleanup()?;

    let transfer = SftpTransfer {
        host: args.host,
        remote_dir: args.remote_dir,
        local_dir: args.local_dir,
        ssh_key: args.ssh_key,
        sftp_program: args.sftp_program,
        ssh_program: args.ssh_program,
    };
    sync(&transfer)
    // Lock released when the guard drops, on success and failure alike.
}

/// Marker, fetch, purge, marker removal. Shared by the CLI and tests.
#[instrument(skip(transfer), fields(host = %transfer.host, remote = %transfer.remote_dir))]
pub fn sync(transfer: &SftpTransfer) -> Result<()> {
    let marker = TransferMarker::create(&transfer.local_dir)?;
    transfer.fetch()?;
    transfer.purge_remote(marker.run_id)?;
    marker.complete()?;
    info!("sftp sync finished");
    Ok(())
}
