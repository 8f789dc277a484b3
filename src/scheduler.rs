//! Transaction lifecycle tracker
//!
//! Two periodic procedures move tracked transactions through their lifecycle:
//!
//! - `transaction_initialization` fetches the receipt of every subscribed
//!   transaction (`block_number == 0`) and fills in its chain fields, confirming
//!   it right away when it is already deep enough.
//! - `block_polling` confirms mined transactions once the global config height
//!   is `block_threshold` blocks past them.
//!
//! Every store or chain failure is fatal: it is reported to the shutdown
//! signal and the current tick stops at the first failure.

use crate::config::WorkerOptions;
use crate::error::{FatalError, BLOCK_POLLING, TRANSACTION_INITIALIZATION};
use crate::normalize::chain_fields;
use crate::query::BoolQuery;
use crate::records::{GlobalConfig, TransactionPatch, TransactionRecord, GLOBAL_CONFIG_ID};
use crate::rpc::ChainClient;
use crate::shutdown::ShutdownSignal;
use crate::store::{parse_tx_hash, GlobalConfigStore, TransactionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Tracker state and collaborators.
pub struct TxsScheduler {
    txs: Arc<dyn TransactionStore>,
    global_config: Arc<dyn GlobalConfigStore>,
    chain: Arc<dyn ChainClient>,
    shutdown: Arc<dyn ShutdownSignal>,
    block_threshold: u64,
    block_polling_interval: Duration,
    transaction_initialization_interval: Duration,
    /// Highest confirmation boundary already swept. Not persisted.
    last_block: u64,
}

impl TxsScheduler {
    pub fn new(
        txs: Arc<dyn TransactionStore>,
        global_config: Arc<dyn GlobalConfigStore>,
        chain: Arc<dyn ChainClient>,
        shutdown: Arc<dyn ShutdownSignal>,
        options: &WorkerOptions,
    ) -> Self {
        Self {
            txs,
            global_config,
            chain,
            shutdown,
            block_threshold: options.block_threshold,
            block_polling_interval: options.block_polling_interval(),
            transaction_initialization_interval: options.transaction_initialization_interval(),
            last_block: 0,
        }
    }

    /// Highest confirmation boundary already swept.
    pub fn last_block(&self) -> u64 {
        self.last_block
    }

    /// Confirm mined transactions that are deep enough behind the chain head.
    ///
    /// A fatal error is reported to the shutdown signal before being returned.
    pub async fn block_polling(&mut self) -> Result<(), FatalError> {
        let result = self.confirm_transactions();
        self.escalate(result)
    }

    /// Fetch chain data for subscribed transactions that have not been
    /// initialized yet.
    ///
    /// A fatal error is reported to the shutdown signal before being returned.
    pub async fn transaction_initialization(&mut self) -> Result<(), FatalError> {
        let result = self.initialize_transactions().await;
        self.escalate(result)
    }

    /// Drive both procedures on their own intervals until one fails.
    ///
    /// Missed ticks are delayed rather than replayed in a burst.
    pub async fn run(&mut self) -> Result<(), FatalError> {
        info!(
            "Starting tracker (threshold {}, polling every {:?}, initialization every {:?})",
            self.block_threshold, self.block_polling_interval, self.transaction_initialization_interval
        );

        let mut polling = interval(self.block_polling_interval);
        polling.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut initialization = interval(self.transaction_initialization_interval);
        initialization.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = polling.tick() => self.block_polling().await?,
                _ = initialization.tick() => self.transaction_initialization().await?,
            }
        }
    }

    fn escalate(&self, result: Result<(), FatalError>) -> Result<(), FatalError> {
        if let Err(err) = &result {
            self.shutdown.shutdown_with_error(err.clone());
        }
        result
    }

    fn recover_global_config(&self, procedure: &'static str) -> Result<GlobalConfig, FatalError> {
        match self.global_config.search(GLOBAL_CONFIG_ID) {
            Ok(configs) => configs.into_iter().next().ok_or_else(|| {
                error!("{}: global config '{}' not found", procedure, GLOBAL_CONFIG_ID);
                FatalError::GlobalConfigUnavailable { procedure }
            }),
            Err(e) => {
                error!("{}: global config fetch failed: {:#}", procedure, e);
                Err(FatalError::GlobalConfigUnavailable { procedure })
            }
        }
    }

    fn confirm_transactions(&mut self) -> Result<(), FatalError> {
        let global_config = self.recover_global_config(BLOCK_POLLING)?;

        let current_block = global_config.block_number;
        let boundary = current_block.saturating_sub(self.block_threshold);

        if boundary <= self.last_block {
            return Ok(());
        }

        let query = BoolQuery::confirmable(boundary);
        debug!("{} query: {}", BLOCK_POLLING, query.to_dsl());
        let txs = self.txs.search(&query).map_err(|e| {
            error!("{}: transaction search failed: {:#}", BLOCK_POLLING, e);
            FatalError::FetchTransactions {
                procedure: BLOCK_POLLING,
                reason: String::new(),
            }
        })?;

        for tx in &txs {
            self.txs
                .update(&tx.transaction_hash, &TransactionPatch::Confirm)
                .map_err(|e| FatalError::UpdateTransaction {
                    procedure: BLOCK_POLLING,
                    reason: format!("{:#}", e),
                })?;
            info!(
                "Confirmed tx {} (block {}, head {})",
                tx.transaction_hash, tx.block_number, current_block
            );
        }

        self.last_block = boundary;
        Ok(())
    }

    async fn initialize_transactions(&mut self) -> Result<(), FatalError> {
        let global_config = self.recover_global_config(TRANSACTION_INITIALIZATION)?;

        let query = BoolQuery::uninitialized();
        debug!("{} query: {}", TRANSACTION_INITIALIZATION, query.to_dsl());
        let txs = self
            .txs
            .search(&query)
            .map_err(|e| FatalError::FetchTransactions {
                procedure: TRANSACTION_INITIALIZATION,
                reason: format!("{:#}", e),
            })?;

        for tx in &txs {
            let Some(patch) = self.fetch_initialization(tx, &global_config).await? else {
                continue;
            };
            self.txs
                .update(&tx.transaction_hash, &patch)
                .map_err(|e| FatalError::UpdateTransaction {
                    procedure: TRANSACTION_INITIALIZATION,
                    reason: format!("{:#}", e),
                })?;
            if let TransactionPatch::Initialize {
                block_number,
                confirmed,
                ..
            } = patch
            {
                info!(
                    "Initialized tx {} (block {}, confirmed {})",
                    tx.transaction_hash, block_number, confirmed
                );
            }
        }

        Ok(())
    }

    /// Build the initialization patch for one transaction, or None when the
    /// chain does not know it yet.
    async fn fetch_initialization(
        &self,
        tx: &TransactionRecord,
        global_config: &GlobalConfig,
    ) -> Result<Option<TransactionPatch>, FatalError> {
        let chain_error = |e: anyhow::Error| FatalError::ChainUnavailable {
            procedure: TRANSACTION_INITIALIZATION,
            reason: format!("{:#}", e),
        };

        let hash = parse_tx_hash(&tx.transaction_hash).map_err(|e| FatalError::InvalidRecord {
            procedure: TRANSACTION_INITIALIZATION,
            reason: format!("{:#}", e),
        })?;
        let receipt = self
            .chain
            .get_transaction_receipt(hash)
            .await
            .map_err(chain_error)?;
        let detail = self.chain.get_transaction(hash).await.map_err(chain_error)?;

        let (Some(receipt), Some(detail)) = (receipt, detail) else {
            debug!("Tx {} not mined yet", tx.transaction_hash);
            return Ok(None);
        };

        let chain = chain_fields(&receipt, &detail).map_err(chain_error)?;
        let confirmed =
            global_config.block_number.saturating_sub(receipt.block_number) > self.block_threshold;

        Ok(Some(TransactionPatch::Initialize {
            block_number: receipt.block_number,
            confirmed,
            chain,
        }))
    }
}
