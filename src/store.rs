//! Store traits and RocksDB implementation
//!
//! Provides the transaction store (searchable by `BoolQuery`, partially
//! updatable by hash) and the global config accessor.
//! Uses RocksDB with column families for efficient organization.

use crate::keys::{decode_tx_key, encode_global_config_key, encode_tx_key};
use crate::query::BoolQuery;
use crate::records::{GlobalConfig, TransactionPatch, TransactionRecord};
use alloy_primitives::B256;
use anyhow::{Context, Result};
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;
use std::str::FromStr;

/// Searchable collection of transaction records keyed by hash.
pub trait TransactionStore: Send + Sync {
    /// Return every record matching the query.
    fn search(&self, query: &BoolQuery) -> Result<Vec<TransactionRecord>>;

    /// Apply a partial update to the record with the given hash.
    ///
    /// Fails if no such record exists.
    fn update(&self, transaction_hash: &str, patch: &TransactionPatch) -> Result<()>;

    /// Get a record by hash.
    fn get(&self, transaction_hash: &str) -> Result<Option<TransactionRecord>>;

    /// Insert a new record. Fails if the hash is already stored.
    fn insert(&self, record: &TransactionRecord) -> Result<()>;
}

/// Read access to the global config singleton, plus the writes used by
/// the refresher and admin tooling.
pub trait GlobalConfigStore: Send + Sync {
    /// All configs with the given id (zero or one).
    fn search(&self, id: &str) -> Result<Vec<GlobalConfig>>;

    /// Insert or replace a config.
    fn put(&self, config: &GlobalConfig) -> Result<()>;
}

/// Parse a 0x-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(s: &str) -> Result<B256> {
    B256::from_str(s).with_context(|| format!("Invalid transaction hash: {}", s))
}

/// RocksDB-backed implementation of both stores.
///
/// Column families:
/// - transactions: transaction records
/// - global_config: global config singleton
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all required column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let column_families = vec![
            ColumnFamilyDescriptor::new("transactions", Options::default()),
            ColumnFamilyDescriptor::new("global_config", Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, column_families)
            .context("Failed to open RocksDB database")?;

        Ok(Self { db })
    }

    /// Get a column family handle by name.
    fn get_cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .with_context(|| format!("Column family '{}' not found", name))
    }

    fn put_record(&self, record: &TransactionRecord) -> Result<()> {
        let cf = self.get_cf("transactions")?;
        let key = encode_tx_key(parse_tx_hash(&record.transaction_hash)?);
        let value =
            postcard::to_allocvec(record).context("Failed to serialize transaction record")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put transaction")?;
        Ok(())
    }
}

impl TransactionStore for RocksStore {
    fn search(&self, query: &BoolQuery) -> Result<Vec<TransactionRecord>> {
        let cf = self.get_cf("transactions")?;
        let mut records = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item.context("Failed to read iterator")?;
            decode_tx_key(&key).context("Failed to decode transaction key")?;

            let record: TransactionRecord = postcard::from_bytes(&value)
                .context("Failed to deserialize transaction record")?;
            if query.matches(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn update(&self, transaction_hash: &str, patch: &TransactionPatch) -> Result<()> {
        let mut record = self
            .get(transaction_hash)?
            .with_context(|| format!("Transaction {} not found", transaction_hash))?;
        patch.apply(&mut record);
        record.updated_at = Utc::now();
        self.put_record(&record)
    }

    fn get(&self, transaction_hash: &str) -> Result<Option<TransactionRecord>> {
        let cf = self.get_cf("transactions")?;
        let key = encode_tx_key(parse_tx_hash(transaction_hash)?);
        match self.db.get_cf(cf, &key).context("Failed to get transaction")? {
            Some(bytes) => {
                let record = postcard::from_bytes(&bytes)
                    .context("Failed to deserialize transaction record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn insert(&self, record: &TransactionRecord) -> Result<()> {
        if self.get(&record.transaction_hash)?.is_some() {
            anyhow::bail!("Transaction {} already exists", record.transaction_hash);
        }
        let mut record = record.clone();
        let now = Utc::now();
        record.created_at = now;
        record.updated_at = now;
        self.put_record(&record)
    }
}

impl GlobalConfigStore for RocksStore {
    fn search(&self, id: &str) -> Result<Vec<GlobalConfig>> {
        let cf = self.get_cf("global_config")?;
        let key = encode_global_config_key(id);
        match self.db.get_cf(cf, &key).context("Failed to get global config")? {
            Some(bytes) => {
                let config = postcard::from_bytes(&bytes)
                    .context("Failed to deserialize global config")?;
                Ok(vec![config])
            }
            None => Ok(Vec::new()),
        }
    }

    fn put(&self, config: &GlobalConfig) -> Result<()> {
        let cf = self.get_cf("global_config")?;
        let key = encode_global_config_key(&config.id);
        let value = postcard::to_allocvec(config).context("Failed to serialize global config")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put global config")?;
        Ok(())
    }
}
