//! Durable persistence of the connection descriptor.
//!
//! The manager persists the descriptor on successful connect and clears it
//! on explicit disconnect, so a restarted process can transparently resume
//! its session on the first acquire.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use uia_protocol::{ConnectionDescriptor, DESCRIPTOR_SCHEMA_VERSION};

use crate::error::{Error, Result};

/// Durable save/load/clear contract for the connection descriptor.
///
/// Save and clear are best-effort from the manager's point of view: failures
/// are logged and swallowed, never surfaced to callers.
pub trait ConfigStore: Send + Sync {
	/// Persists `descriptor`, replacing any previous value.
	fn save(&self, descriptor: &ConnectionDescriptor) -> Result<()>;

	/// Loads the persisted descriptor, if any.
	fn load(&self) -> Result<Option<ConnectionDescriptor>>;

	/// Removes the persisted descriptor. A no-op when absent.
	fn clear(&self) -> Result<()>;
}

/// File-backed [`ConfigStore`] storing the descriptor as pretty JSON.
#[derive(Debug)]
pub struct JsonFileStore {
	path: PathBuf,
}

impl JsonFileStore {
	/// Creates a store at `path`. Parent directories are created on save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Backing file path.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigStore for JsonFileStore {
	fn save(&self, descriptor: &ConnectionDescriptor) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let mut normalized = descriptor.clone();
		normalized.schema_version = DESCRIPTOR_SCHEMA_VERSION;
		let content = serde_json::to_string_pretty(&normalized)?;
		fs::write(&self.path, content)?;
		Ok(())
	}

	fn load(&self) -> Result<Option<ConnectionDescriptor>> {
		let content = match fs::read_to_string(&self.path) {
			Ok(c) => c,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(Error::Io(err)),
		};

		let value: serde_json::Value = serde_json::from_str(&content)?;
		let schema_version = value.get("schemaVersion").and_then(|v| v.as_u64()).unwrap_or(0);
		if schema_version == 0 {
			debug!(target = "uia.store", path = %self.path.display(), "removing stored descriptor without schemaVersion");
			let _ = fs::remove_file(&self.path);
			return Ok(None);
		}
		if schema_version != DESCRIPTOR_SCHEMA_VERSION as u64 {
			return Err(Error::Store(format!(
				"unsupported descriptor schemaVersion {schema_version} (expected {DESCRIPTOR_SCHEMA_VERSION})"
			)));
		}

		let parsed: ConnectionDescriptor = serde_json::from_value(value)?;
		Ok(Some(parsed))
	}

	fn clear(&self) -> Result<()> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(Error::Io(err)),
		}
	}
}

#[cfg(test)]
mod tests {
	use tempfile::tempdir;
	use uia_protocol::Platform;

	use super::*;

	fn descriptor() -> ConnectionDescriptor {
		ConnectionDescriptor::new(Platform::Android, "emulator-5554", "com.example.app")
	}

	#[test]
	fn save_then_load_round_trips() {
		let dir = tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("state").join("session.json"));

		store.save(&descriptor()).unwrap();
		let loaded = store.load().unwrap().unwrap();
		assert_eq!(loaded, descriptor());
	}

	#[test]
	fn load_when_absent_is_none() {
		let dir = tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("session.json"));
		assert!(store.load().unwrap().is_none());
	}

	#[test]
	fn descriptor_without_schema_version_is_removed() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("session.json");
		let mut value = serde_json::to_value(descriptor()).unwrap();
		value.as_object_mut().unwrap().remove("schemaVersion");
		fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

		let store = JsonFileStore::new(&path);
		assert!(store.load().unwrap().is_none());
		assert!(!path.exists());
	}

	#[test]
	fn descriptor_with_unknown_schema_version_errors() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("session.json");
		let mut desc = descriptor();
		desc.schema_version = 99;
		fs::write(&path, serde_json::to_string(&desc).unwrap()).unwrap();

		let store = JsonFileStore::new(&path);
		let err = store.load().unwrap_err();
		assert!(
			err.to_string().contains("unsupported descriptor schemaVersion"),
			"unexpected error: {err}"
		);
	}

	#[test]
	fn clear_is_idempotent() {
		let dir = tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("session.json"));

		store.save(&descriptor()).unwrap();
		store.clear().unwrap();
		store.clear().unwrap();
		assert!(store.load().unwrap().is_none());
	}
}
