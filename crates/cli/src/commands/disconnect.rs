use serde_json::json;

use crate::daemon::{DaemonRequest, DaemonResponse, send_request};
use crate::error::Result;
use crate::output;
use crate::paths::daemon_socket_path;

pub async fn run(json: bool) -> Result<()> {
	match send_request(&daemon_socket_path(), DaemonRequest::Disconnect).await? {
		DaemonResponse::Ok => {
			output::emit(json, "disconnect", &json!({ "disconnected": true }), || "disconnected".to_string());
			Ok(())
		}
		other => Err(super::unexpected(other)),
	}
}
