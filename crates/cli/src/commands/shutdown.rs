use serde_json::json;

use crate::daemon::{DaemonRequest, DaemonResponse, send_request};
use crate::error::Result;
use crate::output;
use crate::paths::daemon_socket_path;

pub async fn run(json: bool) -> Result<()> {
	match send_request(&daemon_socket_path(), DaemonRequest::Shutdown).await? {
		DaemonResponse::Ok => {
			output::emit(json, "shutdown", &json!({ "shutdown": true }), || "daemon shutting down".to_string());
			Ok(())
		}
		other => Err(super::unexpected(other)),
	}
}
