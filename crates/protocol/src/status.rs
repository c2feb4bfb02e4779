//! Read models reported by the session manager.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::ConnectionDescriptor;

/// Lifecycle state as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStateKind {
	Disconnected,
	Connecting,
	Connected,
	Recovering,
	Failed,
}

impl fmt::Display for SessionStateKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SessionStateKind::Disconnected => "disconnected",
			SessionStateKind::Connecting => "connecting",
			SessionStateKind::Connected => "connected",
			SessionStateKind::Recovering => "recovering",
			SessionStateKind::Failed => "failed",
		};
		write!(f, "{name}")
	}
}

/// Snapshot returned by `SessionManager::status`. Pure read, no side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
	/// Whether a live handle is currently held.
	pub connected: bool,
	/// Current lifecycle state.
	pub state: SessionStateKind,
	/// Descriptor the session was (or will be) created from.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub descriptor: Option<ConnectionDescriptor>,
	/// Unix seconds of the last successful probe or connect.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_activity: Option<u64>,
	/// Failed attempts in the current recovery episode.
	pub retries: u32,
}

/// Acknowledgement for a successful connect or ensure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
	/// Driver-assigned session identifier.
	pub session_id: String,
	/// Unix seconds when the session was created.
	pub created_at: u64,
}
