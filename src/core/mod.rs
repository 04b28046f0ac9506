//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Snapshot store abstraction
//! - `registry` - Account set and every balance-changing rule
//! - `card_issuer` - Card number, security code and expiry generation
//! - `ledger` - Thread-safe service that persists after each mutation
//! - `async` - Async handle over the ledger

pub mod r#async;
pub mod card_issuer;
pub mod ledger;
pub mod registry;
pub mod traits;

pub use card_issuer::issue_card;
pub use ledger::{AccountAccess, Durability, Ledger, Outcome};
pub use r#async::AsyncLedger;
pub use registry::{Registry, TransferReceipt};
pub use traits::SnapshotStore;
