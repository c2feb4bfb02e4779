use serde_json::json;

use crate::daemon::{DaemonRequest, DaemonResponse, send_request};
use crate::error::Result;
use crate::output;
use crate::paths::daemon_socket_path;

pub async fn run(json: bool) -> Result<()> {
	match send_request(&daemon_socket_path(), DaemonRequest::Ensure).await? {
		DaemonResponse::Ensured { session_id } => {
			output::emit(json, "ensure", &json!({ "sessionId": &session_id }), || {
				format!("session {session_id} is alive")
			});
			Ok(())
		}
		other => Err(super::unexpected(other)),
	}
}
