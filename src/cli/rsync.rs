//! Implementation of `pullbox rsync`.

use std::path::PathBuf;

use clap::Args;
use tracing::{info, instrument};

use crate::{
    lock::{self, InstanceLock},
    transfer::{rsync::RsyncTransfer, TransferMarker},
    Result,
};

#[derive(Debug, Clone, Args)]
pub struct RsyncArgs {
    /// Remote source endpoint, host:path style (the remote directory is
    /// embedded in the endpoint)
    pub source: String,

    /// Local target directory
    pub local_dir: PathBuf,

    /// SSH private key used by the transport
    pub ssh_key: PathBuf,

    /// Lock file path; defaults to <temp dir>/<tool name>.lock
    #[arg(long = "lock-file")]
    pub lock_file: Option<PathBuf>,

    /// Override the rsync executable
    #[arg(long = "rsync-program", default_value = "rsync")]
    pub rsync_program: PathBuf,
}

pub fn execute(args: RsyncArgs) -> Result<()> {
    let lock_path = args
        .lock_file
        .clone()
        .unwrap_or_else(lock::default_lock_path);
    let lock = InstanceLock::acquire(&lock_path)?;
    lock.install_signal_cleanup()?;

    let transfer = RsyncTransfer {
        source: args.source,
        local_dir: args.local_dir,
        ssh_key: args.ssh_key,
        rsync_program: args.rsync_program,
    };
    sync(&transfer)
    // Lock released when the guard drops, on success and failure alike.
}

/// Marker, rsync, marker removal. rsync empties the source incrementally.
#[instrument(skip(transfer), fields(source = %transfer.source))]
pub fn sync(transfer: &RsyncTransfer) -> Result<()> {
    let marker = TransferMarker::create(&transfer.local_dir)?;
    transfer.run()?;
    marker.complete()?;
    info!("rsync sync finished");
    Ok(())
}
