use std::sync::Arc;
use std::time::Duration;

use uia_runtime::{JsonFileStore, ManagerConfig, SessionManager};

use crate::cli::DaemonArgs;
use crate::daemon::Daemon;
use crate::driver::HttpDriver;
use crate::error::Result;
use crate::paths;

pub async fn run(args: DaemonArgs) -> Result<()> {
	let factory = Arc::new(HttpDriver::new(args.driver_url));
	let store = Arc::new(JsonFileStore::new(paths::descriptor_path()));
	let config = ManagerConfig {
		max_attempts: args.max_attempts,
		keepalive_interval: Duration::from_secs(args.keepalive_secs),
		..ManagerConfig::default()
	};

	let manager = SessionManager::start(factory, store, config);
	let daemon = Daemon::start(manager, paths::daemon_socket_path()).await?;
	daemon.run().await?;
	Ok(())
}
