//! Thread-safe ledger service
//!
//! This module provides the `Ledger`, the single ownership boundary around the
//! account registry. It is the only interface external layers (HTTP handlers,
//! the CLI) use to read or change account state.
//!
//! # Design
//!
//! The registry and the snapshot store live behind one `Mutex`. Every
//! operation, whether it touches one account, two accounts or the set of
//! accounts itself, runs inside that critical section:
//!
//! 1. validate and mutate the registry (nothing changes on error)
//! 2. write the full snapshot
//! 3. release the lock
//!
//! Any state a caller can observe has therefore already been handed to the
//! store, and two saves can never interleave. A crash between steps 1 and 2
//! loses only the operation in flight, which was never acknowledged.
//!
//! # Durability
//!
//! A failed snapshot write does not undo or fail a committed mutation. The
//! failure is logged and reported in [`Outcome::durability`] so the caller can
//! decide whether to surface a warning.

use crate::core::registry::{Registry, TransferReceipt};
use crate::core::traits::SnapshotStore;
use crate::types::{
    AccountNumber, AccountSummary, Card, CardSecrets, CardType, LedgerEntry, LedgerError,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Demo accounts seeded by [`Ledger::ensure_demo_accounts`]
pub const DEMO_ACCOUNTS: [(AccountNumber, &str, i64); 2] =
    [(1001, "Amit Sharma", 5000), (1002, "Neha Verma", 8000)];

/// Password given to seeded demo accounts
pub const DEMO_PASSWORD: &str = "pass123";

/// Whether a committed mutation reached the snapshot store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    /// The snapshot containing this mutation was written
    Persisted,
    /// The mutation is live in memory but the snapshot write failed
    NotPersisted { reason: String },
}

impl Durability {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Durability::Persisted)
    }
}

/// Result of a committed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    /// Operation-specific result
    pub value: T,
    pub durability: Durability,
}

/// Proof that the holder authenticated as an account
///
/// Only [`Ledger::authenticate`] creates one. It is required to read card
/// secrets. A token is bound to the session epoch it was issued under and
/// stops working once the account's password changes or the account is
/// closed, even if the number is later reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAccess {
    account: AccountNumber,
    epoch: u64,
}

impl AccountAccess {
    pub fn account(&self) -> AccountNumber {
        self.account
    }
}

struct LedgerState {
    registry: Registry,
    store: Box<dyn SnapshotStore>,
    /// Session epoch currently valid for each account, assigned on first login
    sessions: HashMap<AccountNumber, u64>,
    /// Next epoch to hand out; never reused within a ledger
    next_epoch: u64,
    /// Result of the most recent snapshot write
    last_durability: Durability,
}

impl LedgerState {
    fn session_epoch(&mut self, number: AccountNumber) -> u64 {
        let next_epoch = &mut self.next_epoch;
        *self.sessions.entry(number).or_insert_with(|| {
            let epoch = *next_epoch;
            *next_epoch += 1;
            epoch
        })
    }

    fn persist(&mut self, operation: &str) -> Durability {
        let durability = self.save(operation);
        self.last_durability = durability.clone();
        durability
    }

    fn save(&self, operation: &str) -> Durability {
        let accounts = self.registry.accounts();
        match self.store.save(&accounts) {
            Ok(()) => Durability::Persisted,
            Err(e) => {
                warn!(
                    operation,
                    store = %self.store.describe(),
                    error = %e,
                    "committed mutation was not persisted"
                );
                Durability::NotPersisted {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Concurrency-safe account ledger
///
/// `Ledger` is `Sync`; share it between threads with `Arc`.
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Open a ledger backed by `store`, loading its last snapshot
    ///
    /// Loading is best effort: a missing snapshot starts an empty ledger, and
    /// an unreadable or corrupt snapshot is logged and also starts an empty
    /// ledger. In the latter case the next committed mutation overwrites the
    /// unreadable file, so its contents are lost.
    pub fn open_store(store: Box<dyn SnapshotStore>) -> Self {
        let registry = match store.load() {
            Ok(Some(accounts)) => {
                let registry = Registry::from_accounts(accounts);
                info!(
                    store = %store.describe(),
                    accounts = registry.len(),
                    "loaded snapshot"
                );
                registry
            }
            Ok(None) => {
                info!(store = %store.describe(), "no snapshot found, starting empty");
                Registry::new()
            }
            Err(e) => {
                error!(
                    store = %store.describe(),
                    error = %e,
                    "failed to load snapshot, starting empty"
                );
                Registry::new()
            }
        };
        Self::with_registry(registry, store)
    }

    /// Ledger over an existing registry; nothing is loaded from `store`
    pub fn with_registry(registry: Registry, store: Box<dyn SnapshotStore>) -> Self {
        Ledger {
            state: Mutex::new(LedgerState {
                registry,
                store,
                sessions: HashMap::new(),
                next_epoch: 0,
                last_durability: Durability::Persisted,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // Operations validate before mutating, so a panicking holder cannot
        // leave a half-applied change behind
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut Registry) -> Result<T, LedgerError>,
    ) -> Result<Outcome<T>, LedgerError> {
        self.commit_revoking(operation, None, apply)
    }

    /// Like `commit`, also ending every session of `revoke` on success
    fn commit_revoking<T>(
        &self,
        operation: &'static str,
        revoke: Option<AccountNumber>,
        apply: impl FnOnce(&mut Registry) -> Result<T, LedgerError>,
    ) -> Result<Outcome<T>, LedgerError> {
        let mut state = self.lock();
        let value = apply(&mut state.registry).map_err(|e| {
            debug!(operation, error = %e, "operation rejected");
            e
        })?;
        if let Some(number) = revoke {
            state.sessions.remove(&number);
        }
        let durability = state.persist(operation);
        debug!(operation, persisted = durability.is_persisted(), "operation committed");
        Ok(Outcome { value, durability })
    }

    /// Seed the demo accounts that are not already present
    ///
    /// Returns the numbers that were created. Persists only if something was
    /// seeded; otherwise the durability is that of the last snapshot write.
    pub fn ensure_demo_accounts(&self) -> Outcome<Vec<AccountNumber>> {
        let mut state = self.lock();
        let mut seeded = Vec::new();
        for (number, name, balance) in DEMO_ACCOUNTS {
            if state
                .registry
                .seed(number, name, Decimal::from(balance), DEMO_PASSWORD)
            {
                seeded.push(number);
            }
        }

        let durability = if seeded.is_empty() {
            state.last_durability.clone()
        } else {
            info!(accounts = ?seeded, "seeded demo accounts");
            state.persist("ensure_demo_accounts")
        };
        Outcome {
            value: seeded,
            durability,
        }
    }

    /// Open an account; see [`Registry::open`]
    pub fn open(
        &self,
        name: &str,
        initial_balance: Decimal,
        password: &str,
    ) -> Result<Outcome<AccountSummary>, LedgerError> {
        self.commit("open", |registry| {
            registry
                .open(name, initial_balance, password)
                .map(|account| account.summary())
        })
    }

    /// Verify a password and hand out an access token for the account
    pub fn authenticate(
        &self,
        number: AccountNumber,
        password: &str,
    ) -> Result<(AccountAccess, AccountSummary), LedgerError> {
        let mut state = self.lock();
        let summary = state.registry.authenticate(number, password)?.summary();
        let epoch = state.session_epoch(number);
        Ok((
            AccountAccess {
                account: number,
                epoch,
            },
            summary,
        ))
    }

    pub fn deposit(
        &self,
        number: AccountNumber,
        amount: Decimal,
        note: &str,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.commit("deposit", |registry| registry.deposit(number, amount, note))
    }

    pub fn withdraw(
        &self,
        number: AccountNumber,
        amount: Decimal,
        note: &str,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.commit("withdraw", |registry| registry.withdraw(number, amount, note))
    }

    pub fn add_interest(&self, number: AccountNumber) -> Result<Outcome<Decimal>, LedgerError> {
        self.commit("add_interest", |registry| registry.add_interest(number))
    }

    /// Move funds between two accounts atomically
    ///
    /// Both sides change under the same lock acquisition and are persisted by
    /// a single snapshot write.
    pub fn transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Outcome<TransferReceipt>, LedgerError> {
        self.commit("transfer", |registry| {
            registry.transfer(from, to, amount, note)
        })
    }

    pub fn upi_debit(
        &self,
        number: AccountNumber,
        upi_id: &str,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.commit("upi_debit", |registry| {
            registry.upi_debit(number, upi_id, amount, note)
        })
    }

    pub fn issue_card(
        &self,
        number: AccountNumber,
        card_type: CardType,
    ) -> Result<Outcome<Card>, LedgerError> {
        self.commit("issue_card", |registry| {
            registry.issue_card(number, card_type)
        })
    }

    pub fn change_password(
        &self,
        number: AccountNumber,
        current: &str,
        new_password: &str,
    ) -> Result<Outcome<()>, LedgerError> {
        self.commit_revoking("change_password", Some(number), |registry| {
            registry.change_password(number, current, new_password)
        })
    }

    /// Close an account; the returned summary is its final state
    pub fn close(&self, number: AccountNumber) -> Result<Outcome<AccountSummary>, LedgerError> {
        self.commit_revoking("close", Some(number), |registry| {
            registry.close(number).map(|account| account.summary())
        })
    }

    /// Summaries of all live accounts, sorted by account number
    pub fn list(&self) -> Vec<AccountSummary> {
        self.lock()
            .registry
            .accounts()
            .into_iter()
            .map(|account| account.summary())
            .collect()
    }

    pub fn get(&self, number: AccountNumber) -> Result<AccountSummary, LedgerError> {
        self.lock()
            .registry
            .get(number)
            .map(|account| account.summary())
    }

    /// Public views of the account's cards
    pub fn cards(&self, number: AccountNumber) -> Result<Vec<Card>, LedgerError> {
        self.lock()
            .registry
            .get(number)
            .map(|account| account.public_cards())
    }

    /// Read-only copy of the account's transaction log
    pub fn statement(&self, number: AccountNumber) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.lock()
            .registry
            .get(number)
            .map(|account| account.transactions.clone())
    }

    /// Sensitive fields of a card, for the authenticated owner only
    ///
    /// # Errors
    ///
    /// - `AccessRevoked` if the token predates a password change or a close
    /// - `NotFound` / `CardNotFound` if the account or card does not exist
    pub fn reveal_card(
        &self,
        access: &AccountAccess,
        card_id: &str,
    ) -> Result<CardSecrets, LedgerError> {
        let state = self.lock();
        if state.sessions.get(&access.account) != Some(&access.epoch) {
            return Err(LedgerError::AccessRevoked {
                account: access.account,
            });
        }
        state.registry.card_secrets(access.account, card_id)
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }
}
