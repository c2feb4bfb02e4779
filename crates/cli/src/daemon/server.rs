use std::error::Error as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tracing::{info, warn};
use uia_runtime::SessionManager;

use super::protocol::{DaemonRequest, DaemonResponse};

/// Socket server exposing one [`SessionManager`] to one-shot CLI commands.
///
/// The daemon never disconnects the session on exit: the descriptor stays
/// persisted so the next daemon (or a crashed-and-restarted one) resumes the
/// session on the first `ensure`.
pub struct Daemon {
	manager: SessionManager,
	socket_path: PathBuf,
	shutdown_tx: watch::Sender<bool>,
	shutdown_rx: watch::Receiver<bool>,
	listener: UnixListener,
}

impl Daemon {
	/// Binds the daemon socket, replacing a stale socket file if present.
	pub async fn start(manager: SessionManager, socket_path: PathBuf) -> Result<Self> {
		if socket_path.exists() {
			std::fs::remove_file(&socket_path)
				.with_context(|| format!("failed to remove existing socket: {}", socket_path.display()))?;
		}
		if let Some(parent) = socket_path.parent() {
			if !parent.exists() {
				std::fs::create_dir_all(parent)
					.with_context(|| format!("failed to create socket directory: {}", parent.display()))?;
			}
		}
		let listener = UnixListener::bind(&socket_path)
			.with_context(|| format!("failed to bind daemon socket: {}", socket_path.display()))?;
		info!(target = "uia.daemon", socket = %socket_path.display(), "daemon listening");

		let (shutdown_tx, shutdown_rx) = watch::channel(false);
		Ok(Self {
			manager,
			socket_path,
			shutdown_tx,
			shutdown_rx,
			listener,
		})
	}

	/// Serves clients until a shutdown request or termination signal.
	pub async fn run(self) -> Result<()> {
		use tokio::signal::unix::{SignalKind, signal};

		let Daemon {
			manager,
			socket_path,
			shutdown_tx,
			mut shutdown_rx,
			listener,
		} = self;

		let mut sigterm = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
		let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

		loop {
			tokio::select! {
				_ = shutdown_rx.changed() => {
					if *shutdown_rx.borrow() {
						info!(target = "uia.daemon", "shutdown requested via socket");
						break;
					}
				}
				_ = sigterm.recv() => {
					info!(target = "uia.daemon", "received SIGTERM, shutting down");
					break;
				}
				_ = sigint.recv() => {
					info!(target = "uia.daemon", "received SIGINT, shutting down");
					break;
				}
				accept = listener.accept() => {
					let (stream, _) = accept.context("daemon accept failed")?;
					let manager = manager.clone();
					let shutdown_tx = shutdown_tx.clone();
					tokio::spawn(async move {
						if let Err(err) = handle_client(stream, manager, shutdown_tx).await {
							warn!(target = "uia.daemon", error = %err, "daemon connection error");
						}
					});
				}
			}
		}

		let _ = std::fs::remove_file(&socket_path);
		Ok(())
	}
}

async fn handle_client(stream: UnixStream, manager: SessionManager, shutdown_tx: watch::Sender<bool>) -> Result<()> {
	let (read_half, mut write_half) = tokio::io::split(stream);
	let mut reader = BufReader::new(read_half);
	let mut line = String::new();

	loop {
		line.clear();
		let bytes = reader
			.read_line(&mut line)
			.await
			.context("failed reading daemon request")?;
		if bytes == 0 {
			break;
		}

		let request = match serde_json::from_str::<DaemonRequest>(line.trim_end()) {
			Ok(request) => request,
			Err(err) => {
				let response = DaemonResponse::Error {
					code: "invalid_request".to_string(),
					message: err.to_string(),
				};
				write_response(&mut write_half, &response).await?;
				continue;
			}
		};

		let response = handle_request(&manager, &shutdown_tx, request).await;
		write_response(&mut write_half, &response).await?;
	}

	Ok(())
}

async fn write_response<W>(writer: &mut W, response: &DaemonResponse) -> Result<()>
where
	W: tokio::io::AsyncWrite + Unpin,
{
	let payload = serde_json::to_string(response).context("failed to serialize response")?;
	writer
		.write_all(format!("{payload}\n").as_bytes())
		.await
		.context("failed writing daemon response")?;
	writer.flush().await.context("failed flushing daemon response")?;
	Ok(())
}

async fn handle_request(manager: &SessionManager, shutdown_tx: &watch::Sender<bool>, request: DaemonRequest) -> DaemonResponse {
	match request {
		DaemonRequest::Ping => DaemonResponse::Pong,
		DaemonRequest::Connect { descriptor } => match manager.connect(descriptor).await {
			Ok(info) => DaemonResponse::Session { info },
			Err(err) => session_error(err),
		},
		DaemonRequest::Disconnect => {
			manager.disconnect().await;
			DaemonResponse::Ok
		}
		DaemonRequest::Ensure => match manager.acquire_handle().await {
			Ok(handle) => DaemonResponse::Ensured {
				session_id: handle.session_id().to_string(),
			},
			Err(err) => session_error(err),
		},
		DaemonRequest::Status => DaemonResponse::Status {
			status: manager.status().await,
		},
		DaemonRequest::Shutdown => {
			let _ = shutdown_tx.send(true);
			DaemonResponse::Ok
		}
	}
}

fn session_error(err: uia_runtime::Error) -> DaemonResponse {
	let message = match err.source() {
		Some(source) => format!("{err}: {source}"),
		None => err.to_string(),
	};
	DaemonResponse::Error {
		code: err.code().to_string(),
		message,
	}
}
