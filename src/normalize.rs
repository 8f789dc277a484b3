//! Normalization of chain data into the stored schema
//!
//! Converts receipts and transaction details into `ChainFields`:
//! decimal-string gas values with their natural-log transforms,
//! address formatting and receipt log re-shaping.

use crate::records::{ChainFields, StoredLog};
use crate::types::{Receipt, ReceiptLog, TransactionDetail};
use alloy_primitives::{keccak256, Address, B256, U256};
use anyhow::{Context, Result};

/// Natural logarithm of a decimal-string encoded integer.
///
/// Values below 1 are clamped to 1 so the result is never negative
/// or infinite (a zero gas price maps to 0.0).
pub fn ln_transform(decimal: &str) -> Result<f64> {
    let value: f64 = decimal
        .parse()
        .with_context(|| format!("Invalid decimal value: {}", decimal))?;
    Ok(value.max(1.0).ln())
}

/// Format an address the way addresses are accepted across the platform
/// (EIP-55 checksum).
pub fn to_accepted_address_format(address: Address) -> String {
    address.to_checksum(None)
}

/// Lower-case 0x-prefixed address.
pub fn to_lower_address(address: Address) -> String {
    format!("0x{:x}", address)
}

fn hex_b256(value: B256) -> String {
    format!("0x{:x}", value)
}

/// Identifier of a receipt log, derived from its block hash,
/// transaction hash and log index.
///
/// `log_` followed by the first eight hex digits of
/// keccak256(blockHash ++ transactionHash ++ logIndex), all without `0x`.
pub fn log_id(block_hash: B256, transaction_hash: B256, log_index: u64) -> String {
    let preimage = format!("{:x}{:x}{:x}", block_hash, transaction_hash, log_index);
    let digest = hex::encode(keccak256(preimage.as_bytes()));
    format!("log_{}", &digest[..8])
}

/// Re-shape a receipt log into the stored log schema.
pub fn normalize_log(log: &ReceiptLog) -> StoredLog {
    StoredLog {
        address: to_accepted_address_format(log.address),
        data: log.data.clone(),
        removed: log.removed,
        topics: log.topics.clone(),
        block_hash: hex_b256(log.block_hash),
        block_number: log.block_number,
        transaction_index: log.transaction_index,
        log_index: log.log_index,
        id: log_id(log.block_hash, log.transaction_hash, log.log_index),
        transaction_hash: hex_b256(log.transaction_hash),
    }
}

/// Build the chain-derived fields of a transaction record.
///
/// The gas price comes from the transaction detail; the receipt's
/// effective gas price is used when the node omits it.
pub fn chain_fields(receipt: &Receipt, tx: &TransactionDetail) -> Result<ChainFields> {
    let gas_price = tx
        .gas_price
        .or(receipt.effective_gas_price)
        .unwrap_or(U256::ZERO);

    let gas_used = receipt.gas_used.to_string();
    let cumulative_gas_used = receipt.cumulative_gas_used.to_string();
    let gas_price = gas_price.to_string();

    Ok(ChainFields {
        status: receipt.is_success(),
        block_hash: hex_b256(receipt.block_hash),
        transaction_index: receipt.transaction_index,
        contract_address: receipt.contract_address.map(to_accepted_address_format),
        from_: to_lower_address(receipt.from),
        to_: receipt.to.map(to_lower_address),
        gas_used_ln: ln_transform(&gas_used)?,
        cumulative_gas_used_ln: ln_transform(&cumulative_gas_used)?,
        gas_price_ln: ln_transform(&gas_price)?,
        gas_used,
        cumulative_gas_used,
        gas_price,
        logs_bloom: receipt.logs_bloom.clone(),
        logs: receipt.logs.iter().map(normalize_log).collect(),
    })
}
