//! Connection descriptor: everything needed to (re)create a driver session
//! without caller input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current on-disk schema version for persisted descriptors.
pub const DESCRIPTOR_SCHEMA_VERSION: u32 = 1;

fn descriptor_schema_version() -> u32 {
	DESCRIPTOR_SCHEMA_VERSION
}

/// Target device platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	#[default]
	Android,
	Ios,
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Platform::Android => write!(f, "android"),
			Platform::Ios => write!(f, "ios"),
		}
	}
}

/// Driver-specific tuning applied to every transport call.
///
/// These bound individual driver round-trips; they do not bound the
/// manager's recovery loop, which is attempt-counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTuning {
	/// Timeout for session creation calls, in milliseconds.
	#[serde(default = "default_launch_timeout_ms")]
	pub launch_timeout_ms: u64,
	/// Timeout for probe/teardown calls, in milliseconds.
	#[serde(default = "default_command_timeout_ms")]
	pub command_timeout_ms: u64,
	/// Retries performed by the underlying transport per call.
	#[serde(default)]
	pub transport_retries: u32,
}

fn default_launch_timeout_ms() -> u64 {
	60_000
}

fn default_command_timeout_ms() -> u64 {
	15_000
}

impl Default for DriverTuning {
	fn default() -> Self {
		Self {
			launch_timeout_ms: default_launch_timeout_ms(),
			command_timeout_ms: default_command_timeout_ms(),
			transport_retries: 0,
		}
	}
}

/// Immutable value object describing how to (re)establish a driver session.
///
/// Supplied once by the caller on first connect; reused verbatim on every
/// reconnect. Persisted on successful connect, cleared on explicit
/// disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
	/// Descriptor schema version, used by the persistence layer.
	#[serde(default = "descriptor_schema_version")]
	pub schema_version: u32,
	/// Target device platform.
	#[serde(default)]
	pub platform: Platform,
	/// Device target identifier (serial / UDID).
	pub udid: String,
	/// Application under test (package name or bundle id).
	pub app_id: String,
	/// Launch activity for Android targets.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub activity: Option<String>,
	/// Driver-specific transport tuning.
	#[serde(default)]
	pub tuning: DriverTuning,
}

impl ConnectionDescriptor {
	/// Builds a descriptor for `udid`/`app_id` with default tuning.
	pub fn new(platform: Platform, udid: impl Into<String>, app_id: impl Into<String>) -> Self {
		Self {
			schema_version: DESCRIPTOR_SCHEMA_VERSION,
			platform,
			udid: udid.into(),
			app_id: app_id.into(),
			activity: None,
			tuning: DriverTuning::default(),
		}
	}

	/// Sets the Android launch activity.
	pub fn with_activity(mut self, activity: Option<String>) -> Self {
		self.activity = activity;
		self
	}

	/// Sets transport tuning.
	pub fn with_tuning(mut self, tuning: DriverTuning) -> Self {
		self.tuning = tuning;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tuning_fields_default_when_absent() {
		let json = r#"{"udid":"emulator-5554","appId":"com.example.app"}"#;
		let desc: ConnectionDescriptor = serde_json::from_str(json).unwrap();
		assert_eq!(desc.schema_version, DESCRIPTOR_SCHEMA_VERSION);
		assert_eq!(desc.platform, Platform::Android);
		assert_eq!(desc.tuning.launch_timeout_ms, 60_000);
		assert_eq!(desc.tuning.transport_retries, 0);
	}

	#[test]
	fn descriptor_serializes_camel_case() {
		let desc = ConnectionDescriptor::new(Platform::Ios, "00008110-000A", "com.example.App");
		let value = serde_json::to_value(&desc).unwrap();
		assert_eq!(value["appId"], "com.example.App");
		assert_eq!(value["platform"], "ios");
		assert!(value.get("activity").is_none());
	}
}
