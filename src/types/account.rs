//! Account-related types for the bank ledger
//!
//! This module defines the Account structure held by the registry and the
//! read-only summary handed to external callers.

use super::card::{Card, IssuedCard};
use super::transaction::{AccountNumber, LedgerEntry};
use rust_decimal::Decimal;

/// Account state as owned by the registry
///
/// Created only by the registry and mutated only through registry operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique account number, stable for the lifetime of the account
    pub number: AccountNumber,

    /// Display name of the account holder
    pub name: String,

    /// Current balance, never negative
    pub balance: Decimal,

    /// Hex digest of the account password, never the plaintext
    pub password_digest: String,

    /// Append-only transaction log, ordered by append time
    pub transactions: Vec<LedgerEntry>,

    /// Cards issued to this account
    pub cards: Vec<IssuedCard>,
}

impl Account {
    /// Create an account with an empty log and no cards
    ///
    /// The caller is responsible for appending the OPEN entry.
    pub fn new(
        number: AccountNumber,
        name: impl Into<String>,
        balance: Decimal,
        password_digest: String,
    ) -> Self {
        Account {
            number,
            name: name.into(),
            balance,
            password_digest,
            transactions: Vec::new(),
            cards: Vec::new(),
        }
    }

    /// Build the externally-facing view of this account
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            number: self.number,
            name: self.name.clone(),
            balance: self.balance,
            transactions: self.transactions.clone(),
            cards: self.public_cards(),
        }
    }

    /// Public views of every issued card
    pub fn public_cards(&self) -> Vec<Card> {
        self.cards.iter().map(|issued| issued.card.clone()).collect()
    }
}

/// Read-only snapshot of an account for listings and lookups
///
/// Never carries the password digest or any card secret.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub number: AccountNumber,
    pub name: String,
    pub balance: Decimal,
    pub transactions: Vec<LedgerEntry>,
    pub cards: Vec<Card>,
}
