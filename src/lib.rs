//! txwatch - Ethereum transaction lifecycle tracker
//!
//! Tracks subscribed transactions from submission to confirmation: a
//! persistent RocksDB store of transaction records, a JSON-RPC chain client,
//! and a worker that enriches records once mined and confirms them after
//! enough blocks.

pub mod keys;
pub mod query;
pub mod records;
pub mod store;
pub mod cli;

// Worker modules
pub mod config;
pub mod error;
pub mod gas;
pub mod global_config;
pub mod normalize;
pub mod rpc;
pub mod scheduler;
pub mod service;
pub mod shutdown;
pub mod types;
pub mod worker;

#[cfg(test)]
mod testing;

// Re-export the main types for convenience
pub use error::FatalError;
pub use query::BoolQuery;
pub use records::{GlobalConfig, LifecycleState, TransactionPatch, TransactionRecord};
pub use scheduler::TxsScheduler;
pub use store::{GlobalConfigStore, RocksStore, TransactionStore};
