//! Long-lived daemon owning the single session manager, plus its
//! newline-delimited JSON socket protocol and client helpers.

mod client;
mod protocol;
mod server;

pub use client::send_request;
pub use protocol::{DaemonRequest, DaemonResponse};
pub use server::Daemon;
