use uia_protocol::{ConnectionDescriptor, DriverTuning};

use crate::cli::ConnectArgs;
use crate::daemon::{DaemonRequest, DaemonResponse, send_request};
use crate::error::Result;
use crate::output;
use crate::paths::daemon_socket_path;

pub async fn run(args: ConnectArgs, json: bool) -> Result<()> {
	let descriptor = ConnectionDescriptor::new(args.platform.into(), args.udid, args.app_id)
		.with_activity(args.activity)
		.with_tuning(DriverTuning {
			launch_timeout_ms: args.launch_timeout_ms,
			command_timeout_ms: args.command_timeout_ms,
			transport_retries: args.transport_retries,
		});

	match send_request(&daemon_socket_path(), DaemonRequest::Connect { descriptor }).await? {
		DaemonResponse::Session { info } => {
			output::emit(json, "connect", &info, || format!("connected: session {}", info.session_id));
			Ok(())
		}
		other => Err(super::unexpected(other)),
	}
}
