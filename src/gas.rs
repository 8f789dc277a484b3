//! Gas cost estimation
//!
//! Prices a transaction from the node's current gas price and the global
//! config's ETH/EUR rate.

use crate::records::GLOBAL_CONFIG_ID;
use crate::rpc::ChainClient;
use crate::store::GlobalConfigStore;
use alloy_primitives::U256;
use anyhow::{Context, Result};
use serde::Serialize;

/// Wei per ether.
const WEI_PER_ETH: f64 = 1e18;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasEstimate {
    pub gas_limit: u64,
    /// Gas price in wei (decimal string)
    pub gas_price: String,
    /// Total cost in wei (decimal string)
    pub total_wei: String,
    pub total_eur: f64,
}

/// Calculate the total cost of `gas_limit` gas at `gas_price`.
///
/// Cost = gas_limit * gas_price
pub fn calculate_cost(gas_limit: u64, gas_price: U256) -> U256 {
    U256::from(gas_limit).saturating_mul(gas_price)
}

/// Convert a wei amount into EUR.
pub fn wei_to_eur(wei: U256, eth_eur_price: f64) -> Result<f64> {
    let wei: f64 = wei
        .to_string()
        .parse()
        .context("Failed to convert wei amount")?;
    Ok(wei / WEI_PER_ETH * eth_eur_price)
}

/// Estimate the cost of a transaction using `gas_limit` gas.
pub async fn estimate_cost(
    chain: &dyn ChainClient,
    global_config: &dyn GlobalConfigStore,
    gas_limit: u64,
) -> Result<GasEstimate> {
    let gas_price = chain
        .get_gas_price()
        .await
        .context("Failed to get gas price")?;
    let config = global_config
        .search(GLOBAL_CONFIG_ID)
        .context("Failed to get global config")?
        .into_iter()
        .next()
        .context("Global config not found")?;

    let total = calculate_cost(gas_limit, gas_price);
    Ok(GasEstimate {
        gas_limit,
        gas_price: gas_price.to_string(),
        total_wei: total.to_string(),
        total_eur: wei_to_eur(total, config.eth_eur_price)?,
    })
}
