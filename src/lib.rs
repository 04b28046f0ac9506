//! Rust Bank Ledger Library
//! # Overview
//!
//! This library provides an in-memory demo bank ledger that writes a full JSON
//! snapshot of every account after each committed change.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, LedgerEntry, Card, errors)
//! - [`crypto`] - Password digests
//! - [`core`] - Business logic components:
//!   - [`core::registry`] - Account set and balance rules
//!   - [`core::ledger`] - Thread-safe service with persist-after-commit
//!   - [`core::card_issuer`] - Card number, security code and expiry generation
//! - [`io`] - Snapshot stores and CSV statements
//! - [`cli`] - CLI arguments parsing and command dispatch
//!
//! # Operations
//!
//! - **Open / Close**: create an account with a fresh number, or remove one
//! - **Deposit / Withdraw / Interest**: single-account balance changes
//! - **Transfer**: atomic debit and credit across two accounts
//! - **UPI debit**: payment to an external address (simulated, no settlement)
//! - **Issue card**: attach a debit or credit card
//! - **Authenticate / Change password**: digest-based credentials
//!
//! # Invariants
//!
//! - Balances never go negative
//! - Each account's log replays exactly to its balance
//! - Account numbers are unique among live accounts
//! - A failed operation changes nothing

// Module declarations
pub mod cli;
pub mod core;
pub mod crypto;
pub mod io;
pub mod types;

pub use core::{AccountAccess, AsyncLedger, Durability, Ledger, Outcome, Registry};
pub use io::{write_statement_csv, FileSnapshotStore, MemorySnapshotStore};
pub use types::{
    Account, AccountNumber, AccountSummary, Card, CardSecrets, CardType, EntryKind, LedgerEntry,
    LedgerError, PersistenceError,
};
