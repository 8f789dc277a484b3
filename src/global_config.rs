//! Global config refresher
//!
//! Keeps the global config `block_number` in line with the chain head so the
//! tracker has a current time reference. `eth_eur_price` is left as is.

use crate::error::{FatalError, BLOCK_NUMBER_REFRESH};
use crate::records::{GlobalConfig, GLOBAL_CONFIG_ID};
use crate::rpc::ChainClient;
use crate::shutdown::ShutdownSignal;
use crate::store::GlobalConfigStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub struct GlobalConfigScheduler {
    global_config: Arc<dyn GlobalConfigStore>,
    chain: Arc<dyn ChainClient>,
    shutdown: Arc<dyn ShutdownSignal>,
    refresh_interval: Duration,
}

impl GlobalConfigScheduler {
    pub fn new(
        global_config: Arc<dyn GlobalConfigStore>,
        chain: Arc<dyn ChainClient>,
        shutdown: Arc<dyn ShutdownSignal>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            global_config,
            chain,
            shutdown,
            refresh_interval,
        }
    }

    /// Read the chain head and store it in the global config.
    ///
    /// The stored height never moves backwards. Creates the singleton
    /// (with a zero price) when it does not exist yet.
    pub async fn block_number_refresh(&self) -> Result<(), FatalError> {
        let result = self.refresh().await;
        if let Err(err) = &result {
            self.shutdown.shutdown_with_error(err.clone());
        }
        result
    }

    pub async fn run(&self) -> Result<(), FatalError> {
        info!("Starting global config refresher (every {:?})", self.refresh_interval);
        let mut ticker = interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.block_number_refresh().await?;
        }
    }

    async fn refresh(&self) -> Result<(), FatalError> {
        let head = self
            .chain
            .get_block_number()
            .await
            .map_err(|e| FatalError::ChainUnavailable {
                procedure: BLOCK_NUMBER_REFRESH,
                reason: format!("{:#}", e),
            })?;

        let current = self
            .global_config
            .search(GLOBAL_CONFIG_ID)
            .map_err(|_| FatalError::GlobalConfigUnavailable {
                procedure: BLOCK_NUMBER_REFRESH,
            })?
            .into_iter()
            .next();

        let updated = match current {
            Some(config) if config.block_number >= head => {
                debug!("Global config already at block {} (head {})", config.block_number, head);
                return Ok(());
            }
            Some(config) => GlobalConfig {
                block_number: head,
                ..config
            },
            None => {
                info!("Creating global config at block {}", head);
                GlobalConfig::new(head, 0.0)
            }
        };

        self.global_config
            .put(&updated)
            .map_err(|e| FatalError::UpdateGlobalConfig {
                procedure: BLOCK_NUMBER_REFRESH,
                reason: format!("{:#}", e),
            })?;
        debug!("Global config block number set to {}", head);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChain, FakeGlobalConfig, RecordingShutdown};

    fn refresher(
        global_config: Arc<FakeGlobalConfig>,
        chain: Arc<FakeChain>,
        shutdown: Arc<RecordingShutdown>,
    ) -> GlobalConfigScheduler {
        GlobalConfigScheduler::new(global_config, chain, shutdown, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_refresh_advances_block_number_and_keeps_price() {
        let global_config = Arc::new(FakeGlobalConfig::at_block(100));
        let chain = Arc::new(FakeChain::default());
        *chain.block_number.lock().unwrap() = 105;

        refresher(global_config.clone(), chain, Arc::new(RecordingShutdown::default()))
            .block_number_refresh()
            .await
            .unwrap();

        let config = global_config.current().unwrap();
        assert_eq!(config.block_number, 105);
        assert_eq!(config.eth_eur_price, 1500.0);
    }

    #[tokio::test]
    async fn test_refresh_never_moves_backwards() {
        let global_config = Arc::new(FakeGlobalConfig::at_block(100));
        let chain = Arc::new(FakeChain::default());
        *chain.block_number.lock().unwrap() = 90;

        refresher(global_config.clone(), chain, Arc::new(RecordingShutdown::default()))
            .block_number_refresh()
            .await
            .unwrap();

        assert_eq!(global_config.current().unwrap().block_number, 100);
    }

    #[tokio::test]
    async fn test_refresh_creates_missing_config() {
        let global_config = Arc::new(FakeGlobalConfig::default());
        let chain = Arc::new(FakeChain::default());
        *chain.block_number.lock().unwrap() = 7;

        refresher(global_config.clone(), chain, Arc::new(RecordingShutdown::default()))
            .block_number_refresh()
            .await
            .unwrap();

        assert_eq!(global_config.current(), Some(GlobalConfig::new(7, 0.0)));
    }

    #[tokio::test]
    async fn test_chain_error_is_fatal() {
        let global_config = Arc::new(FakeGlobalConfig::at_block(100));
        let chain = Arc::new(FakeChain {
            error: Some("connection refused".to_string()),
            ..FakeChain::default()
        });
        let shutdown = Arc::new(RecordingShutdown::default());

        let err = refresher(global_config, chain, shutdown.clone())
            .block_number_refresh()
            .await
            .unwrap_err();

        assert_eq!(err.procedure(), BLOCK_NUMBER_REFRESH);
        assert_eq!(
            shutdown.messages(),
            vec![
                "GlobalConfigScheduler::blockNumberRefresh error while fetching chain data: connection refused"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_put_error_is_fatal() {
        let global_config = Arc::new(FakeGlobalConfig {
            put_error: Some("disk full".to_string()),
            ..FakeGlobalConfig::at_block(100)
        });
        let chain = Arc::new(FakeChain::default());
        *chain.block_number.lock().unwrap() = 101;
        let shutdown = Arc::new(RecordingShutdown::default());

        assert!(refresher(global_config, chain, shutdown.clone())
            .block_number_refresh()
            .await
            .is_err());
        assert_eq!(shutdown.messages().len(), 1);
    }
}
