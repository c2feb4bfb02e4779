use serde::{Deserialize, Serialize};
use uia_protocol::{ConnectionDescriptor, SessionInfo, SessionStatus};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonRequest {
	Ping,
	/// Establish a session from `descriptor`, replacing any existing one.
	Connect { descriptor: ConnectionDescriptor },
	Disconnect,
	/// Validate the session, recovering it if needed.
	Ensure,
	Status,
	Shutdown,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonResponse {
	Pong,
	Ok,
	Session { info: SessionInfo },
	Ensured { session_id: String },
	Status { status: SessionStatus },
	Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
	use uia_protocol::{ConnectionDescriptor, Platform};

	use super::*;

	#[test]
	fn requests_are_tagged_snake_case() {
		let descriptor = ConnectionDescriptor::new(Platform::Android, "emulator-5554", "com.example.app");
		let value = serde_json::to_value(DaemonRequest::Connect { descriptor }).unwrap();
		assert_eq!(value["type"], "connect");
		assert_eq!(value["descriptor"]["udid"], "emulator-5554");

		let value = serde_json::to_value(DaemonRequest::Ensure).unwrap();
		assert_eq!(value["type"], "ensure");
	}

	#[test]
	fn error_response_round_trips() {
		let response = DaemonResponse::Error {
			code: "not_connected".into(),
			message: "no active session".into(),
		};
		let json = serde_json::to_string(&response).unwrap();
		let parsed: DaemonResponse = serde_json::from_str(&json).unwrap();
		assert!(matches!(parsed, DaemonResponse::Error { code, .. } if code == "not_connected"));
	}
}
