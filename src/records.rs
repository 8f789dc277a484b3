//! Record types for tracked transactions
//!
//! These structs represent the documents held by the transaction store
//! and the global config singleton.
//! They use postcard for binary serialization, which is compact and deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id of the global config singleton.
pub const GLOBAL_CONFIG_ID: &str = "global";

/// Global config record.
///
/// `block_number` is the current known chain height and the tracker's
/// time reference. `eth_eur_price` is only used for gas estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub id: String,
    pub block_number: u64,
    pub eth_eur_price: f64,
}

impl GlobalConfig {
    /// Create the singleton at the given height.
    pub fn new(block_number: u64, eth_eur_price: f64) -> Self {
        Self {
            id: GLOBAL_CONFIG_ID.to_string(),
            block_number,
            eth_eur_price,
        }
    }
}

/// Log entry in the stored schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLog {
    pub address: String,
    pub data: String,
    pub removed: bool,
    pub topics: Vec<String>,
    pub block_hash: String,
    pub block_number: u64,
    pub transaction_index: u64,
    pub log_index: u64,
    pub id: String,
    pub transaction_hash: String,
}

/// Fields fetched from the chain when a transaction is initialized.
///
/// Gas values are decimal strings since they can exceed any native integer
/// range used by the store; the `_ln` fields are their natural logarithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainFields {
    /// Receipt execution status (true = success)
    pub status: bool,
    pub block_hash: String,
    pub transaction_index: u64,
    /// Present only when the transaction created a contract
    pub contract_address: Option<String>,
    pub from_: String,
    /// None for contract creation
    pub to_: Option<String>,
    pub gas_used: String,
    pub cumulative_gas_used: String,
    pub gas_price: String,
    pub gas_used_ln: f64,
    pub cumulative_gas_used_ln: f64,
    pub gas_price_ln: f64,
    pub logs_bloom: String,
    pub logs: Vec<StoredLog>,
}

/// Tracked transaction.
///
/// `block_number == 0` means the transaction has not been fetched yet, in
/// which case `chain` is None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_hash: String,
    pub block_number: u64,
    pub confirmed: bool,
    pub chain: Option<ChainFields>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a freshly subscribed record.
    pub fn subscribed(transaction_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            transaction_hash,
            block_number: 0,
            confirmed: false,
            chain: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Where the record sits in its lifecycle.
    pub fn state(&self) -> LifecycleState {
        if self.confirmed {
            LifecycleState::Confirmed
        } else if self.block_number == 0 {
            LifecycleState::Subscribed
        } else {
            LifecycleState::MinedPending
        }
    }
}

/// Lifecycle state derived from `block_number` and `confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Subscribed,
    MinedPending,
    Confirmed,
}

/// Partial update applied to a transaction record.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionPatch {
    /// Set `confirmed = true`.
    Confirm,
    /// Fill in everything fetched from the chain in one update.
    Initialize {
        block_number: u64,
        confirmed: bool,
        chain: ChainFields,
    },
}

impl TransactionPatch {
    /// Apply the patch in place. Timestamps are left to the store.
    pub fn apply(&self, record: &mut TransactionRecord) {
        match self {
            TransactionPatch::Confirm => record.confirmed = true,
            TransactionPatch::Initialize {
                block_number,
                confirmed,
                chain,
            } => {
                record.block_number = *block_number;
                record.confirmed = *confirmed;
                record.chain = Some(chain.clone());
            }
        }
    }
}
