//! txwatchctl - transaction tracker admin CLI
//!
//! Subscribes transactions and inspects the tracker's RocksDB store.

use txwatch::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
