//! CLI parsing and dispatch; one subcommand per transfer mode.

use clap::{CommandFactory, Parser, Subcommand};

use crate::{Error, Result};

pub mod rsync;
pub mod sftp;

#[derive(Debug, Clone)]
pub enum Command {
    Sftp(sftp::SftpArgs),
    Rsync(rsync::RsyncArgs),
    None,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

pub fn dispatch(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Sftp(s) => sftp::execute(s),
        Command::Rsync(r) => rsync::execute(r),
        Command::None => Ok(()),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pullbox",
    version,
    about = "Single-instance remote-to-local sync runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,
}

#[derive(Subcommand, Debug)]
enum Subcommands {
    /// Fetch a remote directory over a single SFTP batch session, then purge
    /// the remote source.
    Sftp(sftp::SftpArgs),
    /// Pull files with rsync over SSH, removing each source file as it
    /// transfers.
    Rsync(rsync::RsyncArgs),
}

/// Parse CLI arguments into internal representation. Wrong argument shape is
/// reported as `Error::Usage`; help and version print here and dispatch to
/// nothing.
pub fn parse_args<I, S>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = args.into_iter().map(Into::into).collect();
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                    Ok(CliArgs {
                        command: Command::None,
                    })
                }
                _ => Err(Error::Usage(err.to_string()).into()),
            };
        }
    };

    let command = match cli.command {
        Subcommands::Sftp(args) => Command::Sftp(args),
        Subcommands::Rsync(args) => Command::Rsync(args),
    };

    Ok(CliArgs { command })
}

/// Build the underlying clap `Command` (useful for help/usage contract tests).
pub fn clap_command() -> clap::Command {
    Cli::command()
}
