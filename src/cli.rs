//! CLI implementation for txwatchctl
//!
//! Admin commands over the tracker's store: subscribe transactions, inspect
//! their lifecycle, manage the global config and price gas. All commands
//! output pretty JSON.

use crate::gas::estimate_cost;
use crate::records::{GlobalConfig, LifecycleState, TransactionRecord, GLOBAL_CONFIG_ID};
use crate::rpc::RpcClient;
use crate::service::TxsService;
use crate::store::{GlobalConfigStore, RocksStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Transaction tracker admin tool
#[derive(Parser)]
#[command(name = "txwatchctl")]
#[command(about = "Inspect and manage tracked Ethereum transactions")]
pub struct Cli {
    /// Path to the RocksDB database directory
    #[arg(short, long, default_value = "./txwatch_db")]
    db_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking a transaction
    Subscribe {
        /// Transaction hash (0x + 64 hex chars)
        hash: String,
    },
    /// Get a tracked transaction
    Get {
        /// Transaction hash (0x + 64 hex chars)
        hash: String,
    },
    /// List tracked transactions
    List {
        /// Only list transactions in this state
        #[arg(short, long, value_enum)]
        state: Option<StateArg>,
    },
    /// Get the global config
    GetGlobalConfig,
    /// Set the global config block number
    SetGlobalConfig {
        /// Chain height
        block: u64,
        /// ETH/EUR rate (kept unchanged when omitted)
        #[arg(long)]
        eth_eur_price: Option<f64>,
    },
    /// Estimate the cost of a transaction
    EstimateGas {
        /// Gas limit
        gas_limit: u64,
        /// RPC endpoint URL
        #[arg(short, long, default_value = "http://127.0.0.1:8545")]
        rpc_url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateArg {
    Subscribed,
    Pending,
    Confirmed,
}

impl From<StateArg> for LifecycleState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Subscribed => LifecycleState::Subscribed,
            StateArg::Pending => LifecycleState::MinedPending,
            StateArg::Confirmed => LifecycleState::Confirmed,
        }
    }
}

fn record_json(record: &TransactionRecord) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    value["state"] = json!(format!("{:?}", record.state()));
    Ok(value)
}

fn global_config_json(config: Option<&GlobalConfig>) -> Value {
    match config {
        Some(c) => json!({
            "id": c.id,
            "block_number": c.block_number,
            "eth_eur_price": c.eth_eur_price,
        }),
        None => json!({ "id": GLOBAL_CONFIG_ID, "global_config": null }),
    }
}

/// Run the CLI command and print JSON output.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = Arc::new(
        RocksStore::open(&cli.db_path)
            .with_context(|| format!("Failed to open database at {:?}", cli.db_path))?,
    );
    let service = TxsService::new(store.clone());

    let result = match cli.command {
        Commands::Subscribe { hash } => {
            let record = service.subscribe(&hash)?;
            json!({ "status": "ok", "transaction": record_json(&record)? })
        }
        Commands::Get { hash } => match service.get(&hash)? {
            Some(record) => json!({ "transaction": record_json(&record)? }),
            None => json!({ "transaction_hash": hash.to_lowercase(), "transaction": null }),
        },
        Commands::List { state } => {
            let states = match state {
                Some(state) => vec![state.into()],
                None => vec![
                    LifecycleState::Subscribed,
                    LifecycleState::MinedPending,
                    LifecycleState::Confirmed,
                ],
            };
            let mut transactions = Vec::new();
            for state in states {
                for record in service.list(state)? {
                    transactions.push(record_json(&record)?);
                }
            }
            json!({ "count": transactions.len(), "transactions": transactions })
        }
        Commands::GetGlobalConfig => {
            let config = GlobalConfigStore::search(store.as_ref(), GLOBAL_CONFIG_ID)?
                .into_iter()
                .next();
            global_config_json(config.as_ref())
        }
        Commands::SetGlobalConfig { block, eth_eur_price } => {
            let current = GlobalConfigStore::search(store.as_ref(), GLOBAL_CONFIG_ID)?
                .into_iter()
                .next();
            let price = eth_eur_price
                .or_else(|| current.map(|c| c.eth_eur_price))
                .unwrap_or(0.0);
            let config = GlobalConfig::new(block, price);
            store.put(&config)?;
            let mut value = global_config_json(Some(&config));
            value["status"] = json!("ok");
            value
        }
        Commands::EstimateGas { gas_limit, rpc_url } => {
            let rpc = RpcClient::new(rpc_url);
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            let estimate = runtime.block_on(estimate_cost(&rpc, store.as_ref(), gas_limit))?;
            serde_json::to_value(&estimate)?
        }
    };

    // Pretty print JSON
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
