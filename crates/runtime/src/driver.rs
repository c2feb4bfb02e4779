//! Contracts for the external automation driver.
//!
//! The driver's wire protocol is opaque to the lifecycle manager: all it
//! needs is "create a session", "probe it", and "tear it down". Failures at
//! this boundary are treated uniformly; no error-kind-specific branching
//! happens above it.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use uia_protocol::ConnectionDescriptor;

/// Opaque capability representing one live connection to the automation
/// driver.
#[async_trait]
pub trait DriverSession: Send + Sync + Debug {
	/// Driver-assigned session identifier.
	fn session_id(&self) -> &str;

	/// Cheap, side-effect-free liveness check.
	async fn probe(&self) -> anyhow::Result<()>;

	/// Best-effort teardown. Idempotent; safe to call on an already-dead
	/// session.
	async fn destroy(&self) -> anyhow::Result<()>;
}

/// Produces driver sessions from a connection descriptor.
#[async_trait]
pub trait DriverFactory: Send + Sync {
	/// Creates a fresh session on the device described by `descriptor`.
	async fn create_session(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<Arc<dyn DriverSession>>;
}
