//! Client side of the daemon socket protocol.

use std::path::Path;

use anyhow::anyhow;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::{DaemonRequest, DaemonResponse};
use crate::error::{CliError, Result};

/// Sends one request to the daemon at `socket` and reads one response.
pub async fn send_request(socket: &Path, request: DaemonRequest) -> Result<DaemonResponse> {
	let stream = match UnixStream::connect(socket).await {
		Ok(stream) => stream,
		Err(err)
			if matches!(
				err.kind(),
				std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
			) =>
		{
			return Err(CliError::DaemonNotRunning);
		}
		Err(err) => return Err(CliError::Io(err)),
	};

	let (read_half, mut write_half) = tokio::io::split(stream);
	let payload = serde_json::to_string(&request)?;
	write_half.write_all(format!("{payload}\n").as_bytes()).await?;
	write_half.flush().await?;

	let mut reader = BufReader::new(read_half);
	let mut line = String::new();
	let bytes = reader.read_line(&mut line).await?;
	if bytes == 0 {
		return Err(CliError::Other(anyhow!("daemon closed the connection without responding")));
	}

	Ok(serde_json::from_str(line.trim_end())?)
}
