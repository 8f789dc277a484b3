//! Fatal tracker errors
//!
//! Every error the lifecycle procedures can hit is unrecoverable and is
//! escalated to the shutdown signal. The display string is the
//! procedure-qualified message handed to the signal.

use thiserror::Error;

pub const BLOCK_POLLING: &str = "TxsScheduler::blockPolling";
pub const TRANSACTION_INITIALIZATION: &str = "TxsScheduler::transactionInitialization";
pub const BLOCK_NUMBER_REFRESH: &str = "GlobalConfigScheduler::blockNumberRefresh";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// Global config fetch failed or returned nothing.
    #[error("{procedure} unable to recover global config")]
    GlobalConfigUnavailable { procedure: &'static str },

    /// Transaction store query failed. `reason` is omitted from the
    /// message when empty.
    #[error("{procedure} error while fetching txs{}", suffix(.reason))]
    FetchTransactions {
        procedure: &'static str,
        reason: String,
    },

    #[error("{procedure} error while updating tx: {reason}")]
    UpdateTransaction {
        procedure: &'static str,
        reason: String,
    },

    /// A stored record is unusable (e.g. its hash does not parse).
    #[error("{procedure} invalid tx record: {reason}")]
    InvalidRecord {
        procedure: &'static str,
        reason: String,
    },

    /// Node transport failure (a null receipt is not one).
    #[error("{procedure} error while fetching chain data: {reason}")]
    ChainUnavailable {
        procedure: &'static str,
        reason: String,
    },

    /// A write to the global config failed.
    #[error("{procedure} error while updating global config: {reason}")]
    UpdateGlobalConfig {
        procedure: &'static str,
        reason: String,
    },
}

fn suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(": {}", reason)
    }
}

impl FatalError {
    /// Procedure that raised the error.
    pub fn procedure(&self) -> &'static str {
        match self {
            FatalError::GlobalConfigUnavailable { procedure }
            | FatalError::FetchTransactions { procedure, .. }
            | FatalError::UpdateTransaction { procedure, .. }
            | FatalError::InvalidRecord { procedure, .. }
            | FatalError::ChainUnavailable { procedure, .. }
            | FatalError::UpdateGlobalConfig { procedure, .. } => procedure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = FatalError::GlobalConfigUnavailable {
            procedure: BLOCK_POLLING,
        };
        assert_eq!(
            err.to_string(),
            "TxsScheduler::blockPolling unable to recover global config"
        );

        let err = FatalError::FetchTransactions {
            procedure: BLOCK_POLLING,
            reason: String::new(),
        };
        assert_eq!(err.to_string(), "TxsScheduler::blockPolling error while fetching txs");

        let err = FatalError::FetchTransactions {
            procedure: TRANSACTION_INITIALIZATION,
            reason: "unexpected_error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "TxsScheduler::transactionInitialization error while fetching txs: unexpected_error"
        );

        let err = FatalError::UpdateTransaction {
            procedure: BLOCK_POLLING,
            reason: "unexpected_error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "TxsScheduler::blockPolling error while updating tx: unexpected_error"
        );
        assert_eq!(err.procedure(), BLOCK_POLLING);

        let err = FatalError::InvalidRecord {
            procedure: TRANSACTION_INITIALIZATION,
            reason: "Invalid transaction hash: 0xzz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "TxsScheduler::transactionInitialization invalid tx record: Invalid transaction hash: 0xzz"
        );
    }
}
