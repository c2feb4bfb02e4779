//! Session state machine, recovery, and keep-alive.
//!
//! One [`SessionManager`] owns exactly one driver session. Every mutating
//! operation serializes on a single async mutex; slow driver calls (session
//! creation, the settle delay between teardown and reconnect) run with the
//! lock released under a claimed `Connecting`/`Recovering` state so that
//! `disconnect` can land in between. An epoch counter, bumped by every
//! connect/disconnect, invalidates in-flight attempts: an attempt that
//! observes a changed epoch on re-acquire destroys whatever it created and
//! reports [`Error::Superseded`] instead of resurrecting a torn-down
//! session.
//!
//! Callers parked behind an in-flight transition wait on a [`Notify`] and
//! re-evaluate the state once it settles, so one failure episode produces
//! exactly one reconnect sequence no matter how many callers observe it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, Notify, watch};
use tracing::{debug, info, warn};
use uia_protocol::{ConnectionDescriptor, SessionInfo, SessionStateKind, SessionStatus};

use crate::driver::{DriverFactory, DriverSession};
use crate::error::{Error, Result};
use crate::store::ConfigStore;

/// Recovery and keep-alive tuning.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
	/// Reconnect attempts per failure episode before giving up.
	pub max_attempts: u32,
	/// Delay between destroying a stale handle and dialing a replacement,
	/// giving the driver time to release device resources.
	pub settle_delay: Duration,
	/// Interval between background keep-alive probes.
	pub keepalive_interval: Duration,
}

impl Default for ManagerConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			settle_delay: Duration::from_secs(2),
			keepalive_interval: Duration::from_secs(300),
		}
	}
}

/// Lifecycle state. The handle lives inside the `Connected` variant so
/// "handle exists iff connected" holds structurally.
enum SessionState {
	Disconnected,
	Connecting,
	Connected {
		handle: Arc<dyn DriverSession>,
		created_at: u64,
	},
	Recovering,
	Failed,
}

impl SessionState {
	fn kind(&self) -> SessionStateKind {
		match self {
			SessionState::Disconnected => SessionStateKind::Disconnected,
			SessionState::Connecting => SessionStateKind::Connecting,
			SessionState::Connected { .. } => SessionStateKind::Connected,
			SessionState::Recovering => SessionStateKind::Recovering,
			SessionState::Failed => SessionStateKind::Failed,
		}
	}
}

struct Inner {
	state: SessionState,
	/// Descriptor used for every (re)connect. Present from the first connect
	/// (or a store restore) until explicit disconnect.
	descriptor: Option<ConnectionDescriptor>,
	/// Failed reconnect attempts in the current episode.
	retries: u32,
	/// Bumped by every connect/disconnect; in-flight attempts that observe a
	/// different value discard their result.
	epoch: u64,
	/// Unix seconds of the last successful probe or connect.
	last_activity: Option<u64>,
	/// Shutdown signal for the running keep-alive task, if any.
	keepalive_stop: Option<watch::Sender<bool>>,
}

struct Shared {
	factory: Arc<dyn DriverFactory>,
	store: Arc<dyn ConfigStore>,
	config: ManagerConfig,
	inner: Mutex<Inner>,
	/// Notified whenever an in-flight transition settles.
	settled: Notify,
}

/// Owns the session state machine, connection descriptor, retry policy, and
/// keep-alive timer for one driver session.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
	shared: Arc<Shared>,
}

impl SessionManager {
	/// Creates a manager and restores any descriptor persisted by a previous
	/// process, so the first [`acquire_handle`](Self::acquire_handle) after a
	/// crash reconnects transparently. A store read failure is logged and
	/// treated as "nothing persisted".
	pub fn start(factory: Arc<dyn DriverFactory>, store: Arc<dyn ConfigStore>, config: ManagerConfig) -> Self {
		let descriptor = match store.load() {
			Ok(Some(descriptor)) => {
				info!(target = "uia.session", udid = %descriptor.udid, "restored connection descriptor from store");
				Some(descriptor)
			}
			Ok(None) => None,
			Err(err) => {
				warn!(target = "uia.session", error = %err, "failed to load stored descriptor; starting disconnected");
				None
			}
		};

		Self {
			shared: Arc::new(Shared {
				factory,
				store,
				config,
				inner: Mutex::new(Inner {
					state: SessionState::Disconnected,
					descriptor,
					retries: 0,
					epoch: 0,
					last_activity: None,
					keepalive_stop: None,
				}),
				settled: Notify::new(),
			}),
		}
	}

	/// Establishes a session from `descriptor`, forcibly replacing any
	/// existing one (old-session teardown is best-effort and never fails the
	/// connect). The descriptor is persisted before dialing so a crash right
	/// after a successful connect still restores.
	///
	/// On factory failure the state becomes `Failed`, the descriptor stays
	/// persisted for a later explicit or implicit reconnect, and the driver
	/// error is surfaced verbatim.
	pub async fn connect(&self, descriptor: ConnectionDescriptor) -> Result<SessionInfo> {
		let mut guard = self.shared.inner.lock().await;
		guard.epoch += 1;
		let epoch = guard.epoch;
		self.stop_keepalive(&mut guard);
		let old = take_handle(&mut guard.state);
		guard.state = SessionState::Connecting;
		guard.retries = 0;
		if let Err(err) = self.shared.store.save(&descriptor) {
			warn!(target = "uia.session", error = %err, "failed to persist connection descriptor");
		}
		guard.descriptor = Some(descriptor.clone());
		drop(guard);

		destroy_quietly(old).await;

		let (_handle, info) = self.establish(&descriptor, epoch).await?;
		Ok(info)
	}

	/// Tears the session down and forgets the descriptor. Idempotent and
	/// infallible from the caller's point of view: handle teardown and store
	/// clearing are best-effort, and any in-flight recovery is invalidated.
	pub async fn disconnect(&self) {
		let mut guard = self.shared.inner.lock().await;
		guard.epoch += 1;
		self.stop_keepalive(&mut guard);
		let old = take_handle(&mut guard.state);
		guard.state = SessionState::Disconnected;
		guard.descriptor = None;
		guard.retries = 0;
		guard.last_activity = None;
		if let Err(err) = self.shared.store.clear() {
			warn!(target = "uia.session", error = %err, "failed to clear stored descriptor");
		}
		self.shared.settled.notify_waiters();
		drop(guard);

		destroy_quietly(old).await;
		info!(target = "uia.session", "disconnected");
	}

	/// Returns a validated session handle, the single entry point for every
	/// caller.
	///
	/// - `Disconnected` with a restored descriptor: implicit reconnect.
	/// - `Disconnected` with nothing persisted: [`Error::NotConnected`].
	/// - `Connected`: liveness probe; a failure enters the shared recovery
	///   path.
	/// - `Failed`: fails fast with [`Error::Unrecoverable`], no driver calls.
	/// - An in-flight transition: parks until it settles, then re-evaluates.
	pub async fn acquire_handle(&self) -> Result<Arc<dyn DriverSession>> {
		enum Step {
			Park,
			FailFast(u32),
			NoDescriptor,
			ImplicitConnect(ConnectionDescriptor),
			Probe(Arc<dyn DriverSession>),
		}

		loop {
			let mut guard = self.shared.inner.lock().await;
			let step = match &guard.state {
				SessionState::Connecting | SessionState::Recovering => Step::Park,
				SessionState::Failed => Step::FailFast(guard.retries),
				SessionState::Disconnected => match guard.descriptor.clone() {
					Some(descriptor) => Step::ImplicitConnect(descriptor),
					None => Step::NoDescriptor,
				},
				SessionState::Connected { handle, .. } => Step::Probe(handle.clone()),
			};

			match step {
				Step::Park => {
					// Register for the wakeup before releasing the lock, or a
					// notify_waiters landing in between is lost.
					let settled = self.shared.settled.notified();
					tokio::pin!(settled);
					settled.as_mut().enable();
					drop(guard);
					settled.await;
				}
				Step::FailFast(attempts) => return Err(Error::Unrecoverable { attempts }),
				Step::NoDescriptor => return Err(Error::NotConnected),
				Step::ImplicitConnect(descriptor) => {
					let epoch = guard.epoch;
					guard.state = SessionState::Connecting;
					drop(guard);
					info!(target = "uia.session", udid = %descriptor.udid, "no live session; connecting from stored descriptor");
					let (handle, _info) = self.establish(&descriptor, epoch).await?;
					return Ok(handle);
				}
				Step::Probe(handle) => match handle.probe().await {
					Ok(()) => {
						guard.retries = 0;
						guard.last_activity = Some(now_ts());
						return Ok(handle);
					}
					Err(err) => {
						warn!(target = "uia.session", error = %err, "session probe failed; entering recovery");
						return self.recover(guard).await;
					}
				},
			}
		}
	}

	/// Point-in-time snapshot. Pure read, safe from any state.
	pub async fn status(&self) -> SessionStatus {
		let guard = self.shared.inner.lock().await;
		SessionStatus {
			connected: matches!(guard.state, SessionState::Connected { .. }),
			state: guard.state.kind(),
			descriptor: guard.descriptor.clone(),
			last_activity: guard.last_activity,
			retries: guard.retries,
		}
	}

	/// Completes a claimed `Connecting` transition: factory call off-lock,
	/// epoch validated on re-acquire.
	async fn establish(&self, descriptor: &ConnectionDescriptor, epoch: u64) -> Result<(Arc<dyn DriverSession>, SessionInfo)> {
		let result = self.shared.factory.create_session(descriptor).await;

		let mut guard = self.shared.inner.lock().await;
		if guard.epoch != epoch {
			drop(guard);
			debug!(target = "uia.session", "connect superseded by concurrent connect/disconnect; discarding result");
			if let Ok(handle) = result {
				destroy_quietly(Some(handle)).await;
			}
			return Err(Error::Superseded);
		}

		match result {
			Ok(handle) => {
				let created_at = now_ts();
				let info = SessionInfo {
					session_id: handle.session_id().to_string(),
					created_at,
				};
				guard.state = SessionState::Connected {
					handle: handle.clone(),
					created_at,
				};
				guard.retries = 0;
				guard.last_activity = Some(created_at);
				self.start_keepalive(&mut guard);
				self.shared.settled.notify_waiters();
				drop(guard);
				info!(target = "uia.session", session_id = %info.session_id, "session established");
				Ok((handle, info))
			}
			Err(source) => {
				guard.state = SessionState::Failed;
				self.stop_keepalive(&mut guard);
				self.shared.settled.notify_waiters();
				drop(guard);
				warn!(target = "uia.session", error = %source, "driver session creation failed");
				Err(Error::DriverCreation { source })
			}
		}
	}

	/// Shared recovery path for caller-triggered and keep-alive probe
	/// failures: an explicit bounded loop, never recursion.
	///
	/// Each attempt destroys the stale handle, waits the settle delay, and
	/// asks the factory for a replacement. The retry counter is the sole
	/// authority on giving up; elapsed time is not a bound. The epoch
	/// captured at entry invalidates the episode if a connect/disconnect
	/// lands while the lock is released.
	async fn recover<'a>(&'a self, mut guard: MutexGuard<'a, Inner>) -> Result<Arc<dyn DriverSession>> {
		let Some(descriptor) = guard.descriptor.clone() else {
			// No descriptor to reconnect with; fold into a plain disconnect.
			let stale = take_handle(&mut guard.state);
			self.stop_keepalive(&mut guard);
			self.shared.settled.notify_waiters();
			drop(guard);
			destroy_quietly(stale).await;
			return Err(Error::NotConnected);
		};
		let epoch = guard.epoch;
		let max_attempts = self.shared.config.max_attempts;
		let mut stale = take_handle(&mut guard.state);
		guard.state = SessionState::Recovering;

		loop {
			if guard.retries >= max_attempts {
				let attempts = guard.retries;
				guard.state = SessionState::Failed;
				self.stop_keepalive(&mut guard);
				self.shared.settled.notify_waiters();
				drop(guard);
				warn!(target = "uia.session", attempts, "reconnect attempts exhausted; session unrecoverable");
				return Err(Error::Unrecoverable { attempts });
			}
			guard.retries += 1;
			let attempt = guard.retries;
			drop(guard);

			destroy_quietly(stale.take()).await;

			debug!(target = "uia.session", attempt, max_attempts, "waiting for driver to settle before reconnect");
			tokio::time::sleep(self.shared.config.settle_delay).await;

			let result = self.shared.factory.create_session(&descriptor).await;

			guard = self.shared.inner.lock().await;
			if guard.epoch != epoch {
				drop(guard);
				debug!(target = "uia.session", "recovery superseded by concurrent connect/disconnect; discarding result");
				if let Ok(handle) = result {
					destroy_quietly(Some(handle)).await;
				}
				return Err(Error::Superseded);
			}

			match result {
				Ok(handle) => {
					let created_at = now_ts();
					guard.state = SessionState::Connected {
						handle: handle.clone(),
						created_at,
					};
					guard.retries = 0;
					guard.last_activity = Some(created_at);
					self.shared.settled.notify_waiters();
					drop(guard);
					info!(target = "uia.session", session_id = handle.session_id(), attempt, "session recovered");
					return Ok(handle);
				}
				Err(err) => {
					warn!(target = "uia.session", attempt, max_attempts, error = %err, "reconnect attempt failed");
				}
			}
		}
	}

	/// One keep-alive probe. Returns `false` once the session left the
	/// keep-alive's purview (disconnected, superseded, or unrecoverable).
	async fn keepalive_tick(&self) -> bool {
		let mut guard = self.shared.inner.lock().await;
		let handle = match &guard.state {
			SessionState::Connected { handle, .. } => handle.clone(),
			SessionState::Connecting | SessionState::Recovering => {
				// A caller already owns the transition; this tick is redundant.
				debug!(target = "uia.session", "keep-alive tick skipped; transition in flight");
				return true;
			}
			SessionState::Disconnected | SessionState::Failed => return false,
		};

		match handle.probe().await {
			Ok(()) => {
				guard.retries = 0;
				guard.last_activity = Some(now_ts());
				debug!(target = "uia.session", "keep-alive probe ok");
				true
			}
			Err(err) => {
				warn!(target = "uia.session", error = %err, "keep-alive probe failed; entering recovery");
				match self.recover(guard).await {
					Ok(_) => true,
					Err(_) => false,
				}
			}
		}
	}

	/// Replaces any running keep-alive task with a fresh one. Called under
	/// the state lock.
	fn start_keepalive(&self, guard: &mut Inner) {
		self.stop_keepalive(guard);
		let (stop_tx, stop_rx) = watch::channel(false);
		guard.keepalive_stop = Some(stop_tx);
		let manager = self.clone();
		let period = self.shared.config.keepalive_interval;
		tokio::spawn(keepalive_loop(manager, stop_rx, period));
	}

	fn stop_keepalive(&self, guard: &mut Inner) {
		if let Some(stop) = guard.keepalive_stop.take() {
			let _ = stop.send(true);
		}
	}
}

async fn keepalive_loop(manager: SessionManager, mut stop_rx: watch::Receiver<bool>, period: Duration) {
	let mut ticker = tokio::time::interval(period);
	ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
	// The first tick of a tokio interval completes immediately.
	ticker.tick().await;

	loop {
		tokio::select! {
			changed = stop_rx.changed() => {
				if changed.is_err() || *stop_rx.borrow() {
					break;
				}
			}
			_ = ticker.tick() => {
				if !manager.keepalive_tick().await {
					break;
				}
			}
		}
	}
	debug!(target = "uia.session", "keep-alive loop stopped");
}

/// Detaches the handle from `state`, leaving it `Disconnected`. The caller
/// sets the state it actually wants afterwards.
fn take_handle(state: &mut SessionState) -> Option<Arc<dyn DriverSession>> {
	match std::mem::replace(state, SessionState::Disconnected) {
		SessionState::Connected { handle, .. } => Some(handle),
		_ => None,
	}
}

/// Best-effort teardown; failures are logged and swallowed by design of the
/// driver contract.
async fn destroy_quietly(handle: Option<Arc<dyn DriverSession>>) {
	if let Some(handle) = handle {
		if let Err(err) = handle.destroy().await {
			debug!(target = "uia.session", session_id = handle.session_id(), error = %err, "session teardown failed (ignored)");
		}
	}
}

fn now_ts() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_matches_contract() {
		let config = ManagerConfig::default();
		assert_eq!(config.max_attempts, 3);
		assert_eq!(config.settle_delay, Duration::from_secs(2));
		assert_eq!(config.keepalive_interval, Duration::from_secs(300));
	}

	#[test]
	fn take_handle_leaves_disconnected() {
		let mut state = SessionState::Failed;
		assert!(take_handle(&mut state).is_none());
		assert!(matches!(state, SessionState::Disconnected));
	}

	#[test]
	fn state_kinds_map_one_to_one() {
		assert_eq!(SessionState::Disconnected.kind(), SessionStateKind::Disconnected);
		assert_eq!(SessionState::Connecting.kind(), SessionStateKind::Connecting);
		assert_eq!(SessionState::Recovering.kind(), SessionStateKind::Recovering);
		assert_eq!(SessionState::Failed.kind(), SessionStateKind::Failed);
	}
}
