//! Transaction subscription service
//!
//! Entry point for callers that want a transaction tracked: a subscribed
//! hash is stored unfetched (`block_number == 0`, unconfirmed) and picked up
//! by the tracker's initialization procedure.

use crate::query::{BoolQuery, Range};
use crate::records::{LifecycleState, TransactionRecord};
use crate::store::{parse_tx_hash, TransactionStore};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct TxsService {
    txs: Arc<dyn TransactionStore>,
}

impl TxsService {
    pub fn new(txs: Arc<dyn TransactionStore>) -> Self {
        Self { txs }
    }

    /// Start tracking a transaction hash.
    ///
    /// The hash is normalized to lower case. Subscribing a hash that is
    /// already tracked returns the stored record untouched.
    pub fn subscribe(&self, transaction_hash: &str) -> Result<TransactionRecord> {
        let hash = parse_tx_hash(transaction_hash)?;
        let key = format!("0x{:x}", hash);

        if let Some(existing) = self.txs.get(&key)? {
            return Ok(existing);
        }

        let record = TransactionRecord::subscribed(key.clone(), Utc::now());
        self.txs
            .insert(&record)
            .with_context(|| format!("Failed to subscribe {}", key))?;
        info!("Subscribed tx {}", key);

        // Re-read so store-managed timestamps are returned
        Ok(self.txs.get(&key)?.unwrap_or(record))
    }

    pub fn get(&self, transaction_hash: &str) -> Result<Option<TransactionRecord>> {
        let hash = parse_tx_hash(transaction_hash)?;
        self.txs.get(&format!("0x{:x}", hash))
    }

    /// All records in a lifecycle state.
    pub fn list(&self, state: LifecycleState) -> Result<Vec<TransactionRecord>> {
        let query = match state {
            LifecycleState::Subscribed => BoolQuery::uninitialized(),
            LifecycleState::MinedPending => BoolQuery::new().term_confirmed(false).range_block_number(Range {
                gt: Some(0),
                ..Range::default()
            }),
            LifecycleState::Confirmed => BoolQuery::new().term_confirmed(true),
        };
        self.txs.search(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tx_record, FakeTxStore, HASH_A, HASH_B};

    #[test]
    fn test_subscribe_creates_unfetched_record() {
        let store = Arc::new(FakeTxStore::default());
        let service = TxsService::new(store.clone());

        let record = service.subscribe(HASH_A).unwrap();
        assert_eq!(record.transaction_hash, HASH_A);
        assert_eq!(record.block_number, 0);
        assert!(!record.confirmed);
        assert_eq!(record.state(), LifecycleState::Subscribed);
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let store = Arc::new(FakeTxStore::with_records(vec![tx_record(HASH_A, 38, true)]));
        let service = TxsService::new(store.clone());

        let record = service.subscribe(HASH_A).unwrap();
        assert_eq!(record.block_number, 38);
        assert!(record.confirmed);
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subscribe_normalizes_case() {
        let store = Arc::new(FakeTxStore::default());
        let service = TxsService::new(store);
        let upper = HASH_A.to_uppercase().replacen("0X", "0x", 1);

        let record = service.subscribe(&upper).unwrap();
        assert_eq!(record.transaction_hash, HASH_A);
        assert!(service.get(&upper).unwrap().is_some());
    }

    #[test]
    fn test_subscribe_rejects_invalid_hash() {
        let service = TxsService::new(Arc::new(FakeTxStore::default()));
        assert!(service.subscribe("0x1234").is_err());
        assert!(service.subscribe("not a hash").is_err());
    }

    #[test]
    fn test_list_by_state() {
        let hash_c = "0x00000000000000000000000000000000000000000000000000000000000000cc";
        let store = Arc::new(FakeTxStore::with_records(vec![
            tx_record(HASH_A, 0, false),
            tx_record(HASH_B, 38, false),
            tx_record(hash_c, 30, true),
        ]));
        let service = TxsService::new(store);

        let hashes = |state| -> Vec<String> {
            service
                .list(state)
                .unwrap()
                .into_iter()
                .map(|r| r.transaction_hash)
                .collect()
        };
        assert_eq!(hashes(LifecycleState::Subscribed), vec![HASH_A.to_string()]);
        assert_eq!(hashes(LifecycleState::MinedPending), vec![HASH_B.to_string()]);
        assert_eq!(hashes(LifecycleState::Confirmed), vec![hash_c.to_string()]);
    }
}
