use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Acquire was called with no active session and no stored descriptor.
	#[error("not connected: no active session and no stored descriptor")]
	NotConnected,

	/// Retry budget exhausted; terminal until an explicit reconnect.
	#[error("session unrecoverable after {attempts} failed reconnect attempts")]
	Unrecoverable { attempts: u32 },

	/// The driver factory failed to produce a session.
	#[error("driver session creation failed")]
	DriverCreation {
		#[source]
		source: anyhow::Error,
	},

	/// An in-flight connect or recovery was invalidated by a concurrent
	/// connect/disconnect and discarded its result.
	#[error("superseded by a concurrent connect or disconnect")]
	Superseded,

	/// The config store held a descriptor this build cannot read.
	#[error("config store failure: {0}")]
	Store(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Stable machine-readable code used by delivery layers.
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotConnected => "not_connected",
			Error::Unrecoverable { .. } => "session_unrecoverable",
			Error::DriverCreation { .. } => "driver_creation_failed",
			Error::Superseded => "superseded",
			Error::Store(_) => "store_failure",
			Error::Io(_) => "io_error",
			Error::Json(_) => "json_error",
		}
	}
}
