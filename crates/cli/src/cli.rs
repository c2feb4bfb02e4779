use clap::{Args, Parser, Subcommand, ValueEnum};
use uia_protocol::Platform;

#[derive(Debug, Parser)]
#[command(name = "uia", version, about = "Drive mobile UI test sessions against a device driver")]
pub struct Cli {
	/// Increase log verbosity (-v, -vv).
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,

	/// Emit a machine-readable JSON envelope instead of text.
	#[arg(long, global = true)]
	pub json: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Establish a driver session and persist its descriptor.
	Connect(ConnectArgs),
	/// Tear the session down and forget the descriptor.
	Disconnect,
	/// Validate the session, recovering it if needed.
	Ensure,
	/// Report session state.
	Status,
	/// Run the session daemon in the foreground.
	Daemon(DaemonArgs),
	/// Ask a running daemon to exit.
	Shutdown,
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
	/// Device serial / UDID.
	#[arg(long)]
	pub udid: String,

	/// Application under test (package name or bundle id).
	#[arg(long = "app")]
	pub app_id: String,

	/// Target platform.
	#[arg(long, value_enum, default_value = "android")]
	pub platform: PlatformArg,

	/// Launch activity for Android targets.
	#[arg(long)]
	pub activity: Option<String>,

	/// Session creation timeout in milliseconds.
	#[arg(long, default_value_t = 60_000)]
	pub launch_timeout_ms: u64,

	/// Per-command driver timeout in milliseconds.
	#[arg(long, default_value_t = 15_000)]
	pub command_timeout_ms: u64,

	/// Transport-level retries per driver call.
	#[arg(long, default_value_t = 0)]
	pub transport_retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
	Android,
	Ios,
}

impl From<PlatformArg> for Platform {
	fn from(value: PlatformArg) -> Self {
		match value {
			PlatformArg::Android => Platform::Android,
			PlatformArg::Ios => Platform::Ios,
		}
	}
}

#[derive(Debug, Args)]
pub struct DaemonArgs {
	/// Base URL of the device-driver service.
	#[arg(long, default_value = "http://127.0.0.1:4723")]
	pub driver_url: String,

	/// Keep-alive probe interval in seconds.
	#[arg(long, default_value_t = 300)]
	pub keepalive_secs: u64,

	/// Reconnect attempts per failure episode before giving up.
	#[arg(long, default_value_t = 3)]
	pub max_attempts: u32,
}

#[cfg(test)]
mod tests {
	use clap::Parser;

	use super::*;

	#[test]
	fn connect_parses_required_flags() {
		let cli = Cli::parse_from(["uia", "connect", "--udid", "emulator-5554", "--app", "com.example.app"]);
		let Command::Connect(args) = cli.command else {
			panic!("expected connect command");
		};
		assert_eq!(args.udid, "emulator-5554");
		assert_eq!(args.app_id, "com.example.app");
		assert_eq!(args.platform, PlatformArg::Android);
		assert_eq!(args.launch_timeout_ms, 60_000);
	}

	#[test]
	fn connect_accepts_ios_platform() {
		let cli = Cli::parse_from(["uia", "connect", "--udid", "00008110-000A", "--app", "com.example.App", "--platform", "ios"]);
		let Command::Connect(args) = cli.command else {
			panic!("expected connect command");
		};
		assert_eq!(Platform::from(args.platform), Platform::Ios);
	}

	#[test]
	fn verbosity_accumulates() {
		let cli = Cli::parse_from(["uia", "-vv", "status"]);
		assert_eq!(cli.verbose, 2);
		assert!(matches!(cli.command, Command::Status));
	}

	#[test]
	fn daemon_defaults_match_manager_contract() {
		let cli = Cli::parse_from(["uia", "daemon"]);
		let Command::Daemon(args) = cli.command else {
			panic!("expected daemon command");
		};
		assert_eq!(args.keepalive_secs, 300);
		assert_eq!(args.max_attempts, 3);
	}
}
