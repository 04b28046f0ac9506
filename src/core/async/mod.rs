//! Asynchronous access to the ledger
//!
//! - **AsyncLedger**: cloneable handle that runs ledger operations on tokio's
//!   blocking pool

pub mod ledger;

pub use ledger::AsyncLedger;
