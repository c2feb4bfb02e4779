//! HTTP client for the external device-driver service.
//!
//! The driver exposes a session-oriented control surface; only the three
//! lifecycle calls matter to the manager: create, probe, destroy. Everything
//! else (taps, swipes, app commands) goes through the handle elsewhere and
//! never touches lifecycle state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uia_protocol::ConnectionDescriptor;
use uia_runtime::{DriverFactory, DriverSession};

/// `POST /session` response subset from the device driver.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
	session_id: String,
}

/// [`DriverFactory`] speaking plain HTTP to the device-driver service.
pub struct HttpDriver {
	base_url: String,
	client: reqwest::Client,
}

impl HttpDriver {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			client: reqwest::Client::new(),
		}
	}
}

#[async_trait]
impl DriverFactory for HttpDriver {
	async fn create_session(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<Arc<dyn DriverSession>> {
		let capabilities = json!({
			"platformName": descriptor.platform.to_string(),
			"udid": descriptor.udid,
			"appId": descriptor.app_id,
			"activity": descriptor.activity,
			"commandTimeoutMs": descriptor.tuning.command_timeout_ms,
		});
		let url = format!("{}/session", self.base_url);
		let timeout = Duration::from_millis(descriptor.tuning.launch_timeout_ms);
		debug!(target = "uia.driver", %url, udid = %descriptor.udid, "creating driver session");

		let body = json!({ "capabilities": capabilities });
		let response = send_with_retries(
			|| self.client.post(&url).timeout(timeout).json(&body),
			descriptor.tuning.transport_retries,
		)
		.await?;
		let response = response
			.error_for_status()
			.map_err(|err| anyhow!("driver rejected session: {err}"))?;
		let created: CreateSessionResponse = response.json().await.context("malformed driver response")?;
		debug!(target = "uia.driver", session_id = %created.session_id, "driver session created");

		Ok(Arc::new(HttpSession {
			base_url: self.base_url.clone(),
			client: self.client.clone(),
			session_id: created.session_id,
			command_timeout: Duration::from_millis(descriptor.tuning.command_timeout_ms),
			transport_retries: descriptor.tuning.transport_retries,
		}))
	}
}

#[derive(Debug)]
struct HttpSession {
	base_url: String,
	client: reqwest::Client,
	session_id: String,
	command_timeout: Duration,
	transport_retries: u32,
}

#[async_trait]
impl DriverSession for HttpSession {
	fn session_id(&self) -> &str {
		&self.session_id
	}

	async fn probe(&self) -> anyhow::Result<()> {
		let url = format!("{}/session/{}/status", self.base_url, self.session_id);
		let response = send_with_retries(
			|| self.client.get(&url).timeout(self.command_timeout),
			self.transport_retries,
		)
		.await?;
		response
			.error_for_status()
			.map(|_| ())
			.map_err(|err| anyhow!("session not alive: {err}"))
	}

	async fn destroy(&self) -> anyhow::Result<()> {
		let url = format!("{}/session/{}", self.base_url, self.session_id);
		let response = send_with_retries(
			|| self.client.delete(&url).timeout(self.command_timeout),
			self.transport_retries,
		)
		.await?;
		// 404 means the session is already gone; teardown is idempotent.
		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Ok(());
		}
		response
			.error_for_status()
			.map(|_| ())
			.map_err(|err| anyhow!("session teardown rejected: {err}"))
	}
}

/// Retries a request on transport errors (connection refused, timeouts)
/// up to `retries` extra attempts. HTTP error statuses are not retried;
/// the lifecycle manager owns that policy.
async fn send_with_retries<F>(make: F, retries: u32) -> anyhow::Result<reqwest::Response>
where
	F: Fn() -> reqwest::RequestBuilder,
{
	let mut attempt = 0;
	loop {
		match make().send().await {
			Ok(response) => return Ok(response),
			Err(err) if attempt < retries => {
				attempt += 1;
				debug!(target = "uia.driver", attempt, error = %err, "transport error; retrying");
			}
			Err(err) => return Err(anyhow::Error::new(err).context("driver unreachable")),
		}
	}
}
