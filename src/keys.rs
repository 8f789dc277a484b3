//! Key encoding and decoding utilities
//!
//! All keys use a single-byte prefix followed by binary data.
//! This ensures deterministic, lexicographically ordered keys in RocksDB.

use alloy_primitives::B256;
use anyhow::Result;

/// Encode a transaction key.
///
/// Format: byte 'T' (0x54) + transaction_hash (32 bytes)
/// Total length: 33 bytes
pub fn encode_tx_key(hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.push(b'T');
    key.extend_from_slice(hash.as_slice());
    key
}

/// Decode a transaction key back into its hash.
pub fn decode_tx_key(key: &[u8]) -> Result<B256> {
    if key.len() != 33 || key[0] != b'T' {
        anyhow::bail!("Invalid transaction key (len {})", key.len());
    }
    Ok(B256::from_slice(&key[1..]))
}

/// Encode a global config key.
///
/// Format: byte 'G' (0x47) + id (utf-8 bytes)
pub fn encode_global_config_key(id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + id.len());
    key.push(b'G');
    key.extend_from_slice(id.as_bytes());
    key
}
