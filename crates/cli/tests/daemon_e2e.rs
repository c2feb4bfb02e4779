//! End-to-end daemon test over a real Unix socket with a stubbed driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::tempdir;
use uia_cli::daemon::{Daemon, DaemonRequest, DaemonResponse, send_request};
use uia_protocol::{ConnectionDescriptor, Platform, SessionStateKind};
use uia_runtime::{DriverFactory, DriverSession, JsonFileStore, ManagerConfig, SessionManager};

#[derive(Debug)]
struct StubSession {
	id: String,
}

#[async_trait]
impl DriverSession for StubSession {
	fn session_id(&self) -> &str {
		&self.id
	}

	async fn probe(&self) -> anyhow::Result<()> {
		Ok(())
	}

	async fn destroy(&self) -> anyhow::Result<()> {
		Ok(())
	}
}

#[derive(Default)]
struct StubDriver {
	created: AtomicUsize,
}

#[async_trait]
impl DriverFactory for StubDriver {
	async fn create_session(&self, _descriptor: &ConnectionDescriptor) -> anyhow::Result<Arc<dyn DriverSession>> {
		let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
		Ok(Arc::new(StubSession { id: format!("stub-{n}") }))
	}
}

#[tokio::test]
async fn daemon_serves_full_session_lifecycle() {
	let dir = tempdir().unwrap();
	let socket = dir.path().join("daemon.sock");
	let store = Arc::new(JsonFileStore::new(dir.path().join("session.json")));
	let manager = SessionManager::start(Arc::new(StubDriver::default()), store, ManagerConfig::default());

	let daemon = Daemon::start(manager, socket.clone()).await.unwrap();
	let server = tokio::spawn(daemon.run());

	let response = send_request(&socket, DaemonRequest::Ping).await.unwrap();
	assert!(matches!(response, DaemonResponse::Pong));

	// Ensure before any connect is a clear "never connected" error.
	let response = send_request(&socket, DaemonRequest::Ensure).await.unwrap();
	assert!(matches!(response, DaemonResponse::Error { code, .. } if code == "not_connected"));

	let descriptor = ConnectionDescriptor::new(Platform::Android, "emulator-5554", "com.example.app");
	let response = send_request(&socket, DaemonRequest::Connect { descriptor }).await.unwrap();
	let DaemonResponse::Session { info } = response else {
		panic!("unexpected response: {response:?}");
	};
	assert_eq!(info.session_id, "stub-1");

	let response = send_request(&socket, DaemonRequest::Ensure).await.unwrap();
	assert!(matches!(response, DaemonResponse::Ensured { session_id } if session_id == "stub-1"));

	let response = send_request(&socket, DaemonRequest::Status).await.unwrap();
	let DaemonResponse::Status { status } = response else {
		panic!("unexpected response: {response:?}");
	};
	assert!(status.connected);
	assert_eq!(status.state, SessionStateKind::Connected);

	let response = send_request(&socket, DaemonRequest::Disconnect).await.unwrap();
	assert!(matches!(response, DaemonResponse::Ok));

	let response = send_request(&socket, DaemonRequest::Ensure).await.unwrap();
	assert!(matches!(response, DaemonResponse::Error { code, .. } if code == "not_connected"));

	let response = send_request(&socket, DaemonRequest::Shutdown).await.unwrap();
	assert!(matches!(response, DaemonResponse::Ok));
	server.await.unwrap().unwrap();
}
