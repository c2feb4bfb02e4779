//! One-shot subcommands; each talks to the running daemon over its socket.

pub mod connect;
pub mod daemon;
pub mod disconnect;
pub mod ensure;
pub mod shutdown;
pub mod status;

use anyhow::anyhow;

use crate::cli::{Cli, Command};
use crate::daemon::DaemonResponse;
use crate::error::{CliError, Result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let json = cli.json;
	match cli.command {
		Command::Connect(args) => connect::run(args, json).await,
		Command::Disconnect => disconnect::run(json).await,
		Command::Ensure => ensure::run(json).await,
		Command::Status => status::run(json).await,
		Command::Daemon(args) => daemon::run(args).await,
		Command::Shutdown => shutdown::run(json).await,
	}
}

/// Maps a daemon error response to [`CliError`]; anything else is a protocol
/// mismatch.
pub(crate) fn unexpected(response: DaemonResponse) -> CliError {
	match response {
		DaemonResponse::Error { code, message } => CliError::Daemon { code, message },
		other => CliError::Other(anyhow!("unexpected daemon response: {other:?}")),
	}
}
