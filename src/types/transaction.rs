//! Transaction log types for the bank ledger
//!
//! Every committed balance-affecting operation appends one [`LedgerEntry`] to the
//! owning account's log. Entries are immutable once appended and record the
//! balance *after* the entry was applied, so the full running total can be
//! replayed from the log alone.

use chrono::{Local, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account number
///
/// Generated numbers lie in `1000..=9999`.
pub type AccountNumber = u32;

/// Timestamp format used in the snapshot file and statements
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minute-precision format accepted when reading older snapshots
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Kinds of transaction log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Account opened with its initial balance
    Open,
    /// Funds credited by a deposit
    Deposit,
    /// Funds debited by a withdrawal
    Withdraw,
    /// Interest credited to the account
    Interest,
    /// Debit side of an internal transfer
    TransferOut,
    /// Credit side of an internal transfer
    TransferIn,
    /// Funds sent to an external UPI address (no receiving side is modeled)
    UpiOut,
    /// A payment card was issued; balance is unchanged
    CardIssue,
}

/// Effect of an entry kind on the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
    Neutral,
}

impl EntryKind {
    /// How this kind of entry moves the balance
    pub fn direction(self) -> Direction {
        match self {
            EntryKind::Open
            | EntryKind::Deposit
            | EntryKind::Interest
            | EntryKind::TransferIn => Direction::Credit,
            EntryKind::Withdraw | EntryKind::TransferOut | EntryKind::UpiOut => Direction::Debit,
            EntryKind::CardIssue => Direction::Neutral,
        }
    }

    /// Wire name, as written to the snapshot file and statements
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Open => "OPEN",
            EntryKind::Deposit => "DEPOSIT",
            EntryKind::Withdraw => "WITHDRAW",
            EntryKind::Interest => "INTEREST",
            EntryKind::TransferOut => "TRANSFER_OUT",
            EntryKind::TransferIn => "TRANSFER_IN",
            EntryKind::UpiOut => "UPI_OUT",
            EntryKind::CardIssue => "CARD_ISSUE",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single immutable transaction log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// When the entry was appended (local time, whole seconds)
    pub timestamp: NaiveDateTime,

    /// What kind of operation produced this entry
    pub kind: EntryKind,

    /// Magnitude of the balance movement
    ///
    /// Always non-negative; the sign is implied by [`EntryKind::direction`].
    /// Use [`LedgerEntry::signed_amount`] when replaying the log.
    pub amount: Decimal,

    /// Balance of the account immediately after this entry was applied
    pub balance_after: Decimal,

    /// Free-text note
    pub note: String,
}

impl LedgerEntry {
    /// Create an entry stamped with the current local time
    ///
    /// The timestamp is truncated to whole seconds so it survives a snapshot
    /// round trip unchanged.
    pub fn new(
        kind: EntryKind,
        amount: Decimal,
        balance_after: Decimal,
        note: impl Into<String>,
    ) -> Self {
        LedgerEntry {
            timestamp: now_to_the_second(),
            kind,
            amount,
            balance_after,
            note: note.into(),
        }
    }

    /// Amount with the sign of its effect on the balance
    ///
    /// Credits are positive, debits negative and card issuance zero.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind.direction() {
            Direction::Credit => self.amount,
            Direction::Debit => -self.amount,
            Direction::Neutral => Decimal::ZERO,
        }
    }
}

fn now_to_the_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Replay a transaction log from zero and return the resulting balance
///
/// Returns `None` if any entry's `balance_after` disagrees with the running
/// total, i.e. the log is not a faithful history of the balance.
pub fn replay_balance(entries: &[LedgerEntry]) -> Option<Decimal> {
    let mut running = Decimal::ZERO;
    for entry in entries {
        running = running.checked_add(entry.signed_amount())?;
        if running != entry.balance_after {
            return None;
        }
    }
    Some(running)
}
