use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("daemon is not running; start it with `uia daemon`")]
	DaemonNotRunning,

	/// Error reported by the daemon over the socket protocol.
	#[error("{message}")]
	Daemon { code: String, message: String },

	#[error(transparent)]
	Session(#[from] uia_runtime::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl CliError {
	/// Stable machine-readable code for the JSON error envelope.
	pub fn code(&self) -> &str {
		match self {
			CliError::DaemonNotRunning => "daemon_not_running",
			CliError::Daemon { code, .. } => code,
			CliError::Session(err) => err.code(),
			CliError::Io(_) => "io_error",
			CliError::Json(_) => "json_error",
			CliError::Other(_) => "internal_error",
		}
	}
}
