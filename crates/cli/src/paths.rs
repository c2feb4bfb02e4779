//! State-directory and daemon-socket path resolution.

use std::path::PathBuf;

/// Directory holding persisted session state.
///
/// `UIA_STATE_DIR` overrides the default of `<config dir>/uia`.
pub fn state_dir() -> PathBuf {
	if let Some(dir) = std::env::var_os("UIA_STATE_DIR") {
		return PathBuf::from(dir);
	}
	dirs::config_dir().map(|d| d.join("uia")).unwrap_or_else(|| PathBuf::from(".uia"))
}

/// File the connection descriptor is persisted to.
pub fn descriptor_path() -> PathBuf {
	state_dir().join("session.json")
}

/// Daemon socket path for the current user.
///
/// Uses `$XDG_RUNTIME_DIR/uia-daemon.sock` if available (already
/// user-permissioned), otherwise falls back to `/tmp/uia-daemon-{uid}.sock`.
pub fn daemon_socket_path() -> PathBuf {
	if let Some(xdg_runtime) = std::env::var_os("XDG_RUNTIME_DIR") {
		return PathBuf::from(xdg_runtime).join("uia-daemon.sock");
	}

	let uid = unsafe { libc::getuid() };
	PathBuf::from(format!("/tmp/uia-daemon-{uid}.sock"))
}
