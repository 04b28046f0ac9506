//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `account`: Account state and its external summary
//! - `card`: Payment card views and secrets
//! - `transaction`: Transaction log entries and identifiers
//! - `error`: Error types for ledger operations and persistence

pub mod account;
pub mod card;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountSummary};
pub use card::{mask_card_number, Card, CardSecrets, CardStatus, CardType, IssuedCard};
pub use error::{LedgerError, PersistenceError};
pub use transaction::{
    replay_balance, AccountNumber, Direction, EntryKind, LedgerEntry, LEGACY_TIMESTAMP_FORMAT,
    TIMESTAMP_FORMAT,
};
