//! Worker wiring
//!
//! Runs the lifecycle tracker next to the global config refresher until
//! either hits a fatal error.

use crate::error::FatalError;
use crate::global_config::GlobalConfigScheduler;
use crate::scheduler::TxsScheduler;
use crate::shutdown::ShutdownHandle;
use tracing::info;

/// Refresh the chain height once, then drive both loops.
///
/// The tracker reads the global config on its first tick, so the
/// singleton must exist before the loops start.
pub async fn run_worker(
    scheduler: &mut TxsScheduler,
    refresher: &GlobalConfigScheduler,
    shutdown: &ShutdownHandle,
) -> Result<(), FatalError> {
    refresher.block_number_refresh().await?;
    info!("Global config ready, starting loops");

    tokio::select! {
        result = scheduler.run() => result,
        result = refresher.run() => result,
        err = shutdown.wait() => Err(err),
    }
}
