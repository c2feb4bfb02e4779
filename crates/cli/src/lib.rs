//! Delivery layer for device UI automation sessions.
//!
//! Thin glue around `uia-runtime`: a clap CLI, a Unix-socket daemon owning
//! the single long-lived [`uia_runtime::SessionManager`], and the concrete
//! HTTP driver factory. No session-lifecycle logic lives here.

pub mod cli;
pub mod commands;
pub mod daemon;
pub mod driver;
pub mod error;
pub mod logging;
pub mod output;
pub mod paths;
