//! Device-driver session lifecycle.
//!
//! This crate owns the session state machine for the external automation
//! driver: validating the handle on demand, recovering it within bounded
//! retry limits, persisting the connection descriptor across restarts, and
//! running the background keep-alive loop.
//!
//! The driver itself stays opaque behind the [`DriverFactory`] and
//! [`DriverSession`] contracts; persistence stays opaque behind
//! [`ConfigStore`]. Delivery layers construct a [`SessionManager`] with
//! concrete implementations and route every session-dependent call through
//! [`SessionManager::acquire_handle`].

/// Contracts for the external automation driver.
pub mod driver;
/// Error taxonomy for lifecycle operations.
pub mod error;
/// Session state machine, recovery, and keep-alive.
pub mod manager;
/// Durable persistence of the connection descriptor.
pub mod store;

pub use driver::{DriverFactory, DriverSession};
pub use error::{Error, Result};
pub use manager::{ManagerConfig, SessionManager};
pub use store::{ConfigStore, JsonFileStore};
