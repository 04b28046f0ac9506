//! Rust Bank Ledger CLI
//!
//! Command-line front end for the demo bank ledger. Every invocation loads the
//! snapshot file, runs one command, and writes the snapshot back if the command
//! changed anything.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- list
//! cargo run -- deposit 1001 250
//! cargo run -- transfer 1001 1002 2000 --note rent
//! cargo run -- --snapshot /tmp/bank.json open "Ravi Kumar" --balance 100 --password secret
//! RUST_LOG=debug cargo run -- statement 1001 > statement.csv
//! ```
//!
//! Demo accounts 1001 and 1002 (password `pass123`) are created on first run
//! unless `--no-demo-accounts` is given.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unknown account, insufficient funds, bad password, etc.)

use rust_bank_ledger::cli;
use rust_bank_ledger::core::Ledger;
use rust_bank_ledger::io::FileSnapshotStore;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let ledger = Ledger::open_store(Box::new(FileSnapshotStore::new(&args.snapshot)));
    if !args.no_demo_accounts {
        ledger.ensure_demo_accounts();
    }

    // Output goes to stdout, logs to stderr
    let mut output = std::io::stdout();
    if let Err(e) = cli::execute(&ledger, args.command, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
