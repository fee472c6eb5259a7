use thiserror::Error;

pub mod cli;
pub mod lock;
pub mod logging;
pub mod transfer;

pub type Result<T> = anyhow::Result<T>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("another instance is already running (lock file {0})")]
    AlreadyRunning(String),
    #[error("{0}")]
    Usage(String),
    #[error("invalid local directory: {0}")]
    InvalidLocalDir(String),
    #[error("local directory not writable: {0}")]
    LocalDirNotWritable(String),
    #[error("{tool} failed: {status}")]
    TransferFailed {
        tool: String,
        status: std::process::ExitStatus,
    },
    #[error("failed to run {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        source: std::io::Error,
    },
    #[error("serialization error")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cli error: {0}")]
    Cli(String),
}

/// Entry point for the library, called by the CLI thin wrapper.
pub fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    // Initialize logging before doing anything else. Defaults to human format for the CLI.
    logging::init_logging(logging::LogFormat::Human)?;

    let cli_args = cli::parse_args(args.into_iter().map(Into::into))?;
    cli::dispatch(cli_args)
}
