//! In-memory fakes of the tracker's collaborators, with call recording
//! and failure injection.

use crate::error::FatalError;
use crate::query::BoolQuery;
use crate::records::{GlobalConfig, TransactionPatch, TransactionRecord};
use crate::rpc::ChainClient;
use crate::shutdown::ShutdownSignal;
use crate::store::{GlobalConfigStore, TransactionStore};
use crate::types::{Receipt, TransactionDetail};
use alloy_primitives::{B256, U256};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const HASH_A: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";
pub const HASH_B: &str = "0x00000000000000000000000000000000000000000000000000000000000000bb";

#[derive(Default)]
pub struct FakeTxStore {
    pub records: Mutex<Vec<TransactionRecord>>,
    pub searches: Mutex<Vec<BoolQuery>>,
    pub updates: Mutex<Vec<(String, TransactionPatch)>>,
    pub search_error: Option<String>,
    pub update_error: Option<String>,
}

impl FakeTxStore {
    pub fn with_records(records: Vec<TransactionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn record(&self, hash: &str) -> TransactionRecord {
        self.get(hash).unwrap().unwrap()
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

/// Record at the given lifecycle position.
pub fn tx_record(hash: &str, block_number: u64, confirmed: bool) -> TransactionRecord {
    let mut record = TransactionRecord::subscribed(hash.to_string(), Utc::now());
    record.block_number = block_number;
    record.confirmed = confirmed;
    record
}

impl TransactionStore for FakeTxStore {
    fn search(&self, query: &BoolQuery) -> Result<Vec<TransactionRecord>> {
        self.searches.lock().unwrap().push(query.clone());
        if let Some(err) = &self.search_error {
            anyhow::bail!("{}", err);
        }
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| query.matches(r)).cloned().collect())
    }

    fn update(&self, transaction_hash: &str, patch: &TransactionPatch) -> Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((transaction_hash.to_string(), patch.clone()));
        if let Some(err) = &self.update_error {
            anyhow::bail!("{}", err);
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.transaction_hash == transaction_hash)
            .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", transaction_hash))?;
        patch.apply(record);
        Ok(())
    }

    fn get(&self, transaction_hash: &str) -> Result<Option<TransactionRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.transaction_hash == transaction_hash)
            .cloned())
    }

    fn insert(&self, record: &TransactionRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.transaction_hash == record.transaction_hash)
        {
            anyhow::bail!("Transaction {} already exists", record.transaction_hash);
        }
        records.push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeGlobalConfig {
    pub config: Mutex<Option<GlobalConfig>>,
    pub search_error: Option<String>,
    pub put_error: Option<String>,
    pub searches: AtomicUsize,
}

impl FakeGlobalConfig {
    pub fn at_block(block_number: u64) -> Self {
        Self {
            config: Mutex::new(Some(GlobalConfig::new(block_number, 1500.0))),
            ..Self::default()
        }
    }

    pub fn failing(err: &str) -> Self {
        Self {
            search_error: Some(err.to_string()),
            ..Self::default()
        }
    }

    pub fn set_block(&self, block_number: u64) {
        let mut config = self.config.lock().unwrap();
        if let Some(config) = config.as_mut() {
            config.block_number = block_number;
        }
    }

    pub fn current(&self) -> Option<GlobalConfig> {
        self.config.lock().unwrap().clone()
    }
}

impl GlobalConfigStore for FakeGlobalConfig {
    fn search(&self, id: &str) -> Result<Vec<GlobalConfig>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.search_error {
            anyhow::bail!("{}", err);
        }
        Ok(self
            .config
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.id == id)
            .cloned()
            .collect())
    }

    fn put(&self, config: &GlobalConfig) -> Result<()> {
        if let Some(err) = &self.put_error {
            anyhow::bail!("{}", err);
        }
        *self.config.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeChain {
    pub receipts: Mutex<HashMap<B256, Receipt>>,
    pub transactions: Mutex<HashMap<B256, TransactionDetail>>,
    pub block_number: Mutex<u64>,
    pub gas_price: U256,
    pub network_id: u64,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeChain {
    pub fn add(&self, hash: B256, receipt: Option<Receipt>, tx: Option<TransactionDetail>) {
        if let Some(receipt) = receipt {
            self.receipts.lock().unwrap().insert(hash, receipt);
        }
        if let Some(tx) = tx {
            self.transactions.lock().unwrap().insert(hash, tx);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.error {
            anyhow::bail!("{}", err);
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>> {
        self.check()?;
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn get_transaction(&self, tx_hash: B256) -> Result<Option<TransactionDetail>> {
        self.check()?;
        Ok(self.transactions.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn get_gas_price(&self) -> Result<U256> {
        self.check()?;
        Ok(self.gas_price)
    }

    async fn get_block_number(&self) -> Result<u64> {
        // A real node answers after a round trip
        tokio::task::yield_now().await;
        self.check()?;
        Ok(*self.block_number.lock().unwrap())
    }

    async fn network_id(&self) -> Result<u64> {
        self.check()?;
        Ok(self.network_id)
    }
}

#[derive(Default)]
pub struct RecordingShutdown {
    pub errors: Mutex<Vec<FatalError>>,
}

impl RecordingShutdown {
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.to_string())
            .collect()
    }
}

impl ShutdownSignal for RecordingShutdown {
    fn shutdown_with_error(&self, error: FatalError) {
        self.errors.lock().unwrap().push(error);
    }
}
