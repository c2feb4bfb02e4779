use crate::daemon::{DaemonRequest, DaemonResponse, send_request};
use crate::error::Result;
use crate::output;
use crate::paths::daemon_socket_path;

pub async fn run(json: bool) -> Result<()> {
	match send_request(&daemon_socket_path(), DaemonRequest::Status).await? {
		DaemonResponse::Status { status } => {
			output::emit(json, "status", &status, || {
				let mut text = format!("state: {}", status.state);
				if let Some(descriptor) = &status.descriptor {
					text.push_str(&format!("\ndevice: {} ({})", descriptor.udid, descriptor.platform));
					text.push_str(&format!("\napp: {}", descriptor.app_id));
				}
				if let Some(last_activity) = status.last_activity {
					text.push_str(&format!("\nlast activity: {last_activity}"));
				}
				if status.retries > 0 {
					text.push_str(&format!("\nretries this episode: {}", status.retries));
				}
				text
			});
			Ok(())
		}
		other => Err(super::unexpected(other)),
	}
}
