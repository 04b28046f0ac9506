//! Snapshot file format and stores
//!
//! This module centralizes the on-disk representation of the registry:
//! - Record structures for (de)serialization, with the field names of the
//!   snapshot file
//! - Conversion between records and domain types
//! - [`FileSnapshotStore`], a JSON file rewritten in full on every save
//! - [`MemorySnapshotStore`], an in-process store for tests and ephemeral runs
//!
//! There is no schema version field; any change to these records is a
//! breaking change to the file format.

use crate::core::SnapshotStore;
use crate::types::{
    Account, AccountNumber, Card, CardSecrets, CardStatus, CardType, EntryKind, IssuedCard,
    LedgerEntry, PersistenceError, LEGACY_TIMESTAMP_FORMAT, TIMESTAMP_FORMAT,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::NamedTempFile;

/// One account as stored in the snapshot file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "accNo")]
    pub acc_no: AccountNumber,
    pub name: String,
    pub balance: Decimal,
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
    #[serde(default)]
    pub transactions: Vec<EntryRecord>,
    #[serde(default)]
    pub cards: Vec<CardRecord>,
}

/// One transaction log entry as stored in the snapshot file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: Decimal,
    #[serde(rename = "balanceAfter")]
    pub balance_after: Decimal,
    #[serde(default)]
    pub note: String,
}

/// One card as stored in the snapshot file, sensitive fields included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub masked: String,
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub status: CardStatus,
}

impl From<&Account> for AccountRecord {
    fn from(account: &Account) -> Self {
        AccountRecord {
            acc_no: account.number,
            name: account.name.clone(),
            balance: account.balance,
            password_hash: account.password_digest.clone(),
            transactions: account.transactions.iter().map(EntryRecord::from).collect(),
            cards: account.cards.iter().map(CardRecord::from).collect(),
        }
    }
}

impl From<&LedgerEntry> for EntryRecord {
    fn from(entry: &LedgerEntry) -> Self {
        EntryRecord {
            date: entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            kind: entry.kind,
            amount: entry.amount,
            balance_after: entry.balance_after,
            note: entry.note.clone(),
        }
    }
}

impl From<&IssuedCard> for CardRecord {
    fn from(issued: &IssuedCard) -> Self {
        CardRecord {
            id: issued.card.id.clone(),
            masked: issued.card.masked.clone(),
            number: issued.secrets.number.clone(),
            expiry: issued.card.expiry.clone(),
            cvv: issued.secrets.security_code.clone(),
            card_type: issued.card.card_type,
            status: issued.card.status,
        }
    }
}

impl From<CardRecord> for IssuedCard {
    fn from(record: CardRecord) -> Self {
        IssuedCard {
            card: Card {
                id: record.id,
                masked: record.masked,
                expiry: record.expiry,
                card_type: record.card_type,
                status: record.status,
            },
            secrets: CardSecrets {
                number: record.number,
                security_code: record.cvv,
            },
        }
    }
}

/// Convert an AccountRecord back into an Account
///
/// # Errors
///
/// Returns `InvalidRecord` if the balance is negative or an entry's date
/// cannot be parsed.
pub fn convert_account_record(record: AccountRecord) -> Result<Account, PersistenceError> {
    let number = record.acc_no;
    if record.balance < Decimal::ZERO {
        return Err(PersistenceError::InvalidRecord {
            account: number,
            message: format!("negative balance {}", record.balance),
        });
    }

    let transactions = record
        .transactions
        .into_iter()
        .map(|entry| {
            let timestamp =
                parse_timestamp(&entry.date).ok_or_else(|| PersistenceError::InvalidRecord {
                    account: number,
                    message: format!("unparsable date '{}'", entry.date),
                })?;
            Ok(LedgerEntry {
                timestamp,
                kind: entry.kind,
                amount: entry.amount,
                balance_after: entry.balance_after,
                note: entry.note,
            })
        })
        .collect::<Result<Vec<_>, PersistenceError>>()?;

    Ok(Account {
        number,
        name: record.name,
        balance: record.balance,
        password_digest: record.password_hash,
        transactions,
        cards: record.cards.into_iter().map(IssuedCard::from).collect(),
    })
}

fn parse_timestamp(date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(date, LEGACY_TIMESTAMP_FORMAT))
        .ok()
}

/// Encode accounts as the pretty-printed JSON snapshot document
pub fn encode_snapshot(accounts: &[&Account]) -> Result<String, PersistenceError> {
    let records: Vec<AccountRecord> = accounts.iter().map(|a| AccountRecord::from(*a)).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Decode a snapshot document into accounts
///
/// A literal `null` document decodes to no accounts.
pub fn decode_snapshot(json: &str) -> Result<Vec<Account>, PersistenceError> {
    let records: Option<Vec<AccountRecord>> = serde_json::from_str(json)?;
    records
        .unwrap_or_default()
        .into_iter()
        .map(convert_account_record)
        .collect()
}

/// Snapshot stored as a JSON file
///
/// Each save writes the whole document to a temporary file in the same
/// directory, syncs it and renames it over the snapshot, so readers see either
/// the previous or the new snapshot and never a truncated one. Write cost
/// grows with the total size of all histories.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Vec<Account>>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        decode_snapshot(&json).map(Some)
    }

    fn save(&self, accounts: &[&Account]) -> Result<(), PersistenceError> {
        let records: Vec<AccountRecord> =
            accounts.iter().map(|a| AccountRecord::from(*a)).collect();

        let mut temp = NamedTempFile::new_in(self.directory())?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Mutex<Option<Vec<Account>>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

/// Snapshot kept in process memory
///
/// Clones share the same snapshot, so a test can keep a handle after handing
/// the store to a ledger. `set_failing(true)` makes every subsequent save
/// fail, for exercising the unsaved-commit path.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    state: Arc<MemoryState>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out holding the given accounts
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let store = Self::default();
        *store.lock_snapshot() = Some(accounts);
        store
    }

    /// Copy of the last saved snapshot
    pub fn snapshot(&self) -> Option<Vec<Account>> {
        self.lock_snapshot().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.state.saves.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    fn lock_snapshot(&self) -> std::sync::MutexGuard<'_, Option<Vec<Account>>> {
        self.state
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Vec<Account>>, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save(&self, accounts: &[&Account]) -> Result<(), PersistenceError> {
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory store set to fail",
            )));
        }
        *self.lock_snapshot() = Some(accounts.iter().map(|a| (*a).clone()).collect());
        self.state.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
