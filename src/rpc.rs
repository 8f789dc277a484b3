//! JSON-RPC client for Ethereum nodes
//!
//! Provides a typed interface to Ethereum JSON-RPC endpoints behind the
//! `ChainClient` trait consumed by the tracker.
//! Handles hex string parsing and error handling.

use crate::types::{parse_hex_u256, parse_hex_u64, Receipt, TransactionDetail};
use alloy_primitives::{B256, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Chain access needed by the tracker and gas estimation.
///
/// A `None` receipt or transaction means the node does not know the
/// transaction yet (not mined), which is not an error.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>>;

    async fn get_transaction(&self, tx_hash: B256) -> Result<Option<TransactionDetail>>;

    async fn get_gas_price(&self) -> Result<U256>;

    /// Current chain height.
    async fn get_block_number(&self) -> Result<u64>;

    /// Network id reported by `net_version`.
    async fn network_id(&self) -> Result<u64>;
}

/// JSON-RPC client for Ethereum nodes.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Make a JSON-RPC call.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send RPC request {}", method))?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse RPC response")?;

        // Check for RPC error
        if let Some(error) = json.get("error") {
            anyhow::bail!("RPC error: {}", error);
        }

        // Extract result
        json.get("result")
            .cloned()
            .context("RPC response missing 'result' field")
    }

    /// Call a method whose result is a hex quantity string.
    async fn call_quantity(&self, method: &str, params: Value) -> Result<U256> {
        let result = self.call(method, params).await?;
        let s = result
            .as_str()
            .with_context(|| format!("{} response is not a string", method))?;
        parse_hex_u256(s).with_context(|| format!("Failed to parse {} result", method))
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>> {
        let hash_str = format!("0x{:x}", tx_hash);
        let result = self
            .call("eth_getTransactionReceipt", json!([hash_str]))
            .await?;
        serde_json::from_value(result).context("Failed to deserialize receipt")
    }

    async fn get_transaction(&self, tx_hash: B256) -> Result<Option<TransactionDetail>> {
        let hash_str = format!("0x{:x}", tx_hash);
        let result = self
            .call("eth_getTransactionByHash", json!([hash_str]))
            .await?;
        serde_json::from_value(result).context("Failed to deserialize transaction")
    }

    async fn get_gas_price(&self) -> Result<U256> {
        self.call_quantity("eth_gasPrice", json!([])).await
    }

    async fn get_block_number(&self) -> Result<u64> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        let s = result
            .as_str()
            .context("eth_blockNumber response is not a string")?;
        parse_hex_u64(s).context("Failed to parse block number")
    }

    async fn network_id(&self) -> Result<u64> {
        let result = self.call("net_version", json!([])).await?;
        // net_version returns a decimal string, some nodes answer in hex
        let s = result
            .as_str()
            .context("net_version response is not a string")?;
        if s.starts_with("0x") {
            parse_hex_u64(s).context("Failed to parse network id")
        } else {
            s.parse().context("Failed to parse network id")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_formatting() {
        let hash = B256::with_last_byte(0xab);
        assert_eq!(
            format!("0x{:x}", hash),
            "0x00000000000000000000000000000000000000000000000000000000000000ab"
        );
    }

    #[tokio::test]
    async fn test_unreachable_node_is_an_error() {
        let rpc = RpcClient::new("http://127.0.0.1:1".to_string());
        assert!(rpc.get_block_number().await.is_err());
    }
}
