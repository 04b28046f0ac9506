//! Async handle over the blocking ledger
//!
//! `Ledger` serializes every operation behind one mutex and may block on file
//! I/O while holding it. `AsyncLedger` moves each call onto tokio's blocking
//! pool so async callers never stall a runtime worker.
//!
//! # Architecture
//!
//! ```text
//! AsyncLedger (Clone)
//!     └── Arc<Ledger>
//!             └── Mutex<LedgerState>
//! ```

use std::panic;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::task;

use crate::core::ledger::{AccountAccess, Ledger, Outcome};
use crate::core::registry::TransferReceipt;
use crate::types::{
    AccountNumber, AccountSummary, Card, CardSecrets, CardType, LedgerEntry, LedgerError,
};

/// Cloneable async front end for a shared [`Ledger`]
#[derive(Clone)]
pub struct AsyncLedger {
    ledger: Arc<Ledger>,
}

impl AsyncLedger {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// The shared blocking ledger
    pub fn blocking(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Run `f` against the ledger on the blocking pool
    ///
    /// A panic inside `f` is resumed on the awaiting task.
    async fn run<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Ledger) -> T + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        match task::spawn_blocking(move || f(&ledger)).await {
            Ok(value) => value,
            Err(e) => panic::resume_unwind(e.into_panic()),
        }
    }

    pub async fn open(
        &self,
        name: String,
        initial_balance: Decimal,
        password: String,
    ) -> Result<Outcome<AccountSummary>, LedgerError> {
        self.run(move |ledger| ledger.open(&name, initial_balance, &password))
            .await
    }

    pub async fn authenticate(
        &self,
        number: AccountNumber,
        password: String,
    ) -> Result<(AccountAccess, AccountSummary), LedgerError> {
        self.run(move |ledger| ledger.authenticate(number, &password))
            .await
    }

    pub async fn get(&self, number: AccountNumber) -> Result<AccountSummary, LedgerError> {
        self.run(move |ledger| ledger.get(number)).await
    }

    pub async fn list(&self) -> Vec<AccountSummary> {
        self.run(|ledger| ledger.list()).await
    }

    pub async fn cards(&self, number: AccountNumber) -> Result<Vec<Card>, LedgerError> {
        self.run(move |ledger| ledger.cards(number)).await
    }

    pub async fn statement(&self, number: AccountNumber) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.run(move |ledger| ledger.statement(number)).await
    }

    pub async fn reveal_card(
        &self,
        access: AccountAccess,
        card_id: String,
    ) -> Result<CardSecrets, LedgerError> {
        self.run(move |ledger| ledger.reveal_card(&access, &card_id))
            .await
    }

    pub async fn deposit(
        &self,
        number: AccountNumber,
        amount: Decimal,
        note: String,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.run(move |ledger| ledger.deposit(number, amount, &note))
            .await
    }

    pub async fn withdraw(
        &self,
        number: AccountNumber,
        amount: Decimal,
        note: String,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.run(move |ledger| ledger.withdraw(number, amount, &note))
            .await
    }

    pub async fn add_interest(
        &self,
        number: AccountNumber,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.run(move |ledger| ledger.add_interest(number)).await
    }

    pub async fn transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<Outcome<TransferReceipt>, LedgerError> {
        self.run(move |ledger| ledger.transfer(from, to, amount, note.as_deref()))
            .await
    }

    pub async fn upi_debit(
        &self,
        number: AccountNumber,
        upi_id: String,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<Outcome<Decimal>, LedgerError> {
        self.run(move |ledger| ledger.upi_debit(number, &upi_id, amount, note.as_deref()))
            .await
    }

    pub async fn issue_card(
        &self,
        number: AccountNumber,
        card_type: CardType,
    ) -> Result<Outcome<Card>, LedgerError> {
        self.run(move |ledger| ledger.issue_card(number, card_type))
            .await
    }

    pub async fn change_password(
        &self,
        number: AccountNumber,
        current: String,
        new_password: String,
    ) -> Result<Outcome<()>, LedgerError> {
        self.run(move |ledger| ledger.change_password(number, &current, &new_password))
            .await
    }

    pub async fn close(
        &self,
        number: AccountNumber,
    ) -> Result<Outcome<AccountSummary>, LedgerError> {
        self.run(move |ledger| ledger.close(number)).await
    }
}
