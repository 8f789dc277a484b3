//! Transaction tracker worker binary
//!
//! Runs the lifecycle tracker and the global config refresher against a
//! RocksDB store until a fatal error or Ctrl+C.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use txwatch::config::load_options;
use txwatch::global_config::GlobalConfigScheduler;
use txwatch::rpc::{ChainClient, RpcClient};
use txwatch::scheduler::TxsScheduler;
use txwatch::shutdown::ShutdownHandle;
use txwatch::store::RocksStore;
use txwatch::worker::run_worker;

/// Ethereum transaction tracker
#[derive(Parser)]
#[command(name = "txwatch-worker")]
#[command(about = "Track subscribed Ethereum transactions until they are confirmed")]
struct Args {
    /// Path to the TOML options file
    #[arg(short, long, default_value = "txwatch.toml")]
    options: PathBuf,

    /// RPC endpoint URL (overrides the options file)
    #[arg(short, long)]
    rpc_url: Option<String>,

    /// Path to RocksDB database directory (overrides the options file)
    #[arg(short, long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut options = load_options(&args.options)?;
    if let Some(rpc_url) = args.rpc_url {
        options.rpc_url = rpc_url;
    }
    if let Some(db_path) = args.db_path {
        options.db_path = db_path;
    }

    info!("Starting transaction tracker");
    info!("RPC URL: {}", options.rpc_url);
    info!("Database: {:?}", options.db_path);

    let rpc = Arc::new(RpcClient::new(options.rpc_url.clone()));
    let network_id = rpc
        .network_id()
        .await
        .context("Failed to get network id")?;
    if network_id != options.ethereum_network_id {
        anyhow::bail!(
            "Node is on network {}, expected {}",
            network_id,
            options.ethereum_network_id
        );
    }

    let store = Arc::new(
        RocksStore::open(&options.db_path)
            .with_context(|| format!("Failed to open database at {:?}", options.db_path))?,
    );
    let shutdown = Arc::new(ShutdownHandle::new());

    let mut scheduler = TxsScheduler::new(
        store.clone(),
        store.clone(),
        rpc.clone(),
        shutdown.clone(),
        &options,
    );
    let refresher = GlobalConfigScheduler::new(
        store,
        rpc,
        shutdown.clone(),
        options.block_number_refresh_interval(),
    );

    // Stop on the first fatal error or Ctrl+C
    tokio::select! {
        result = run_worker(&mut scheduler, &refresher, &shutdown) => {
            result.context("Tracker stopped on a fatal error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    info!("Tracker stopped");
    Ok(())
}
