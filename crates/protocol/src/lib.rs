//! Shared data types for device-driver session control.
//!
//! This crate contains the serde-serializable types exchanged between the
//! session lifecycle manager, the persistence layer, and the delivery layer.
//! Types here are:
//!
//! - **Pure data**: no behavior beyond (de)serialization and trivial accessors
//! - **Stable**: the persisted descriptor carries a schema version and changes
//!   only deliberately
//!
//! Lifecycle behavior lives in `uia-runtime`; delivery glue in `uia-cli`.

pub mod descriptor;
pub mod status;

pub use descriptor::*;
pub use status::*;
