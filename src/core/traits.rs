//! Core traits for snapshot persistence
//!
//! This module defines the seam between the ledger and durable storage so the
//! file-backed store and the in-memory store can be used interchangeably.

use crate::types::{Account, PersistenceError};

/// Trait for reading and writing full-state snapshots of the registry
///
/// Every `save` replaces the previous snapshot entirely. Implementations are
/// only ever called while the ledger lock is held, so they never see
/// concurrent calls from the same ledger.
pub trait SnapshotStore: Send {
    /// Read the last saved snapshot
    ///
    /// Returns `Ok(None)` when no snapshot has been written yet.
    fn load(&self) -> Result<Option<Vec<Account>>, PersistenceError>;

    /// Replace the snapshot with the given accounts
    fn save(&self, accounts: &[&Account]) -> Result<(), PersistenceError>;

    /// Human-readable location used in log messages
    fn describe(&self) -> String;
}
