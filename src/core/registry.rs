//! Account registry
//!
//! This module provides the `Registry` struct which owns every live account
//! and implements the ledger operations on them.
//!
//! The Registry is responsible for:
//! - Allocating unique account numbers
//! - Validating every operation before any state changes
//! - Applying balance changes with checked arithmetic
//! - Appending exactly one log entry per side of a balance-affecting operation
//!
//! The Registry itself is not synchronized; [`crate::core::Ledger`] wraps it in
//! a single lock together with the snapshot store.

use crate::core::card_issuer::issue_card;
use crate::crypto::{digest, digests_match};
use crate::types::{
    Account, AccountNumber, Card, CardSecrets, CardType, EntryKind, LedgerEntry, LedgerError,
};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Smallest generated account number
pub const ACCOUNT_NUMBER_MIN: AccountNumber = 1000;

/// Largest generated account number
pub const ACCOUNT_NUMBER_MAX: AccountNumber = 9999;

/// Interest credited per `add_interest` call (5%)
pub const INTEREST_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Balances of both sides after a committed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from_balance: Decimal,
    pub to_balance: Decimal,
}

/// In-memory mapping of account numbers to accounts
#[derive(Debug, Default, Clone)]
pub struct Registry {
    /// Map of account numbers to account states
    accounts: HashMap<AccountNumber, Account>,
}

impl Registry {
    /// Create an empty Registry
    pub fn new() -> Self {
        Registry {
            accounts: HashMap::new(),
        }
    }

    /// Build a Registry from previously persisted accounts
    ///
    /// If two accounts share a number, the later one wins.
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Registry {
            accounts: accounts
                .into_iter()
                .map(|account| (account.number, account))
                .collect(),
        }
    }

    /// Number of live accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, number: AccountNumber) -> bool {
        self.accounts.contains_key(&number)
    }

    /// Look up a live account
    pub fn get(&self, number: AccountNumber) -> Result<&Account, LedgerError> {
        self.accounts
            .get(&number)
            .ok_or_else(|| LedgerError::not_found(number))
    }

    fn get_mut(&mut self, number: AccountNumber) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(&number)
            .ok_or_else(|| LedgerError::not_found(number))
    }

    /// All live accounts sorted by account number
    pub fn accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.number);
        accounts
    }

    /// Open a new account with a freshly generated number
    ///
    /// Records an OPEN entry whose amount and resulting balance both equal the
    /// initial balance.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the name is blank or the initial balance is negative
    /// - `CapacityExhausted` if every number in the generation range is taken
    pub fn open(
        &mut self,
        name: &str,
        initial_balance: Decimal,
        password: &str,
    ) -> Result<&Account, LedgerError> {
        self.open_with_rng(name, initial_balance, password, &mut rand::thread_rng())
    }

    /// [`Registry::open`] with an explicit random source for number generation
    pub fn open_with_rng<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        initial_balance: Decimal,
        password: &str,
        rng: &mut R,
    ) -> Result<&Account, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::invalid_input("account name must not be empty"));
        }
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_input(format!(
                "initial balance {} must not be negative",
                initial_balance
            )));
        }

        let number = self.generate_account_number(rng)?;
        let account = opened_account(number, name, initial_balance, password);
        Ok(self.accounts.entry(number).or_insert(account))
    }

    /// Insert an account with a fixed number if that number is free
    ///
    /// Used to seed demo accounts. Returns `false` and leaves the registry
    /// untouched when the number is already live.
    pub fn seed(
        &mut self,
        number: AccountNumber,
        name: &str,
        initial_balance: Decimal,
        password: &str,
    ) -> bool {
        if self.contains(number) {
            return false;
        }
        let account = opened_account(number, name, initial_balance, password);
        self.accounts.insert(number, account);
        true
    }

    /// Draw random numbers from the generation range until a free one is found
    fn generate_account_number<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<AccountNumber, LedgerError> {
        let capacity = (ACCOUNT_NUMBER_MAX - ACCOUNT_NUMBER_MIN + 1) as usize;
        let taken = self
            .accounts
            .keys()
            .filter(|number| (ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX).contains(*number))
            .count();
        if taken >= capacity {
            return Err(LedgerError::CapacityExhausted {
                live: self.accounts.len(),
            });
        }

        loop {
            let candidate = rng.gen_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX);
            if !self.accounts.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Check a password against the stored digest
    ///
    /// # Errors
    ///
    /// - `NotFound` if the account does not exist
    /// - `InvalidCredentials` if the password does not match
    pub fn authenticate(
        &self,
        number: AccountNumber,
        password: &str,
    ) -> Result<&Account, LedgerError> {
        let account = self.get(number)?;
        if !digests_match(password, &account.password_digest) {
            return Err(LedgerError::InvalidCredentials { account: number });
        }
        Ok(account)
    }

    /// Credit funds to an account
    ///
    /// # Returns
    ///
    /// The balance after the deposit
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not positive
    /// - `NotFound` if the account does not exist
    /// - `ArithmeticOverflow` if the balance would overflow
    pub fn deposit(
        &mut self,
        number: AccountNumber,
        amount: Decimal,
        note: &str,
    ) -> Result<Decimal, LedgerError> {
        ensure_positive(amount, "deposit")?;
        let account = self.get_mut(number)?;
        credit(account, EntryKind::Deposit, amount, note.to_string(), "deposit")
    }

    /// Debit funds from an account
    ///
    /// # Returns
    ///
    /// The balance after the withdrawal
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not positive
    /// - `NotFound` if the account does not exist
    /// - `InsufficientFunds` if the balance is lower than the amount
    pub fn withdraw(
        &mut self,
        number: AccountNumber,
        amount: Decimal,
        note: &str,
    ) -> Result<Decimal, LedgerError> {
        ensure_positive(amount, "withdraw")?;
        let account = self.get_mut(number)?;
        debit(account, EntryKind::Withdraw, amount, note.to_string())
    }

    /// Credit interest at [`INTEREST_RATE`] on the current balance
    ///
    /// The interest is the exact product `balance * INTEREST_RATE`, with no
    /// rounding. A zero balance earns a zero INTEREST entry.
    ///
    /// # Returns
    ///
    /// The balance after the interest was credited
    pub fn add_interest(&mut self, number: AccountNumber) -> Result<Decimal, LedgerError> {
        let account = self.get_mut(number)?;
        let interest = account
            .balance
            .checked_mul(INTEREST_RATE)
            .ok_or_else(|| LedgerError::arithmetic_overflow("add_interest", number))?;
        credit(
            account,
            EntryKind::Interest,
            interest,
            "Interest credited".to_string(),
            "add_interest",
        )
    }

    /// Move funds between two live accounts
    ///
    /// All validation happens before either account changes, so a failed
    /// transfer leaves both balances and logs untouched. On success the source
    /// gains a TRANSFER_OUT entry and the destination a TRANSFER_IN entry.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not positive
    /// - `InvalidInput` if source and destination are the same account
    /// - `NotFound` if either account does not exist
    /// - `InsufficientFunds` if the source balance is lower than the amount
    /// - `ArithmeticOverflow` if the destination balance would overflow
    pub fn transfer(
        &mut self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<TransferReceipt, LedgerError> {
        ensure_positive(amount, "transfer")?;
        if from == to {
            return Err(LedgerError::invalid_input(format!(
                "cannot transfer from account {} to itself",
                from
            )));
        }

        let source = self.get(from)?;
        let destination = self.get(to)?;
        if source.balance < amount {
            return Err(LedgerError::insufficient_funds(from, source.balance, amount));
        }
        let from_balance = source.balance - amount;
        let to_balance = destination
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", to))?;

        let out_note = with_note(format!("To {}", to), note);
        let in_note = with_note(format!("From {}", from), note);

        let source = self.get_mut(from)?;
        source.balance = from_balance;
        source.transactions.push(LedgerEntry::new(
            EntryKind::TransferOut,
            amount,
            from_balance,
            out_note,
        ));

        let destination = self.get_mut(to)?;
        destination.balance = to_balance;
        destination.transactions.push(LedgerEntry::new(
            EntryKind::TransferIn,
            amount,
            to_balance,
            in_note,
        ));

        Ok(TransferReceipt {
            from_balance,
            to_balance,
        })
    }

    /// Debit funds sent to an external UPI address
    ///
    /// The receiving party is outside the ledger; only the debit is recorded.
    /// The note defaults to `UPI payment to <upi_id>`.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::withdraw`].
    pub fn upi_debit(
        &mut self,
        number: AccountNumber,
        upi_id: &str,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Decimal, LedgerError> {
        ensure_positive(amount, "upi_debit")?;
        let note = match note {
            Some(note) => note.to_string(),
            None => format!("UPI payment to {}", upi_id),
        };
        let account = self.get_mut(number)?;
        debit(account, EntryKind::UpiOut, amount, note)
    }

    /// Issue a new card to an account
    ///
    /// Appends a CARD_ISSUE entry with a zero amount and the masked number in
    /// its note.
    pub fn issue_card(
        &mut self,
        number: AccountNumber,
        card_type: CardType,
    ) -> Result<Card, LedgerError> {
        let account = self.get_mut(number)?;
        let issued = issue_card(card_type);
        let card = issued.card.clone();

        account.transactions.push(LedgerEntry::new(
            EntryKind::CardIssue,
            Decimal::ZERO,
            account.balance,
            format!("Card issued: {}", card.masked),
        ));
        account.cards.push(issued);

        Ok(card)
    }

    /// Sensitive fields of one of the account's cards
    pub fn card_secrets(
        &self,
        number: AccountNumber,
        card_id: &str,
    ) -> Result<CardSecrets, LedgerError> {
        self.get(number)?
            .cards
            .iter()
            .find(|issued| issued.card.id == card_id)
            .map(|issued| issued.secrets.clone())
            .ok_or_else(|| LedgerError::card_not_found(number, card_id))
    }

    /// Replace the password digest
    ///
    /// Does not append a transaction log entry.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the account does not exist
    /// - `WrongCurrentPassword` if `current` does not match
    pub fn change_password(
        &mut self,
        number: AccountNumber,
        current: &str,
        new_password: &str,
    ) -> Result<(), LedgerError> {
        let account = self.get_mut(number)?;
        if !digests_match(current, &account.password_digest) {
            return Err(LedgerError::WrongCurrentPassword { account: number });
        }
        account.password_digest = digest(new_password);
        Ok(())
    }

    /// Remove an account; the returned value is the final state
    pub fn close(&mut self, number: AccountNumber) -> Result<Account, LedgerError> {
        self.accounts
            .remove(&number)
            .ok_or_else(|| LedgerError::not_found(number))
    }
}

fn opened_account(
    number: AccountNumber,
    name: &str,
    initial_balance: Decimal,
    password: &str,
) -> Account {
    let mut account = Account::new(number, name, initial_balance, digest(password));
    account.transactions.push(LedgerEntry::new(
        EntryKind::Open,
        initial_balance,
        initial_balance,
        "Account opened",
    ));
    account
}

fn ensure_positive(amount: Decimal, operation: &str) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, operation));
    }
    Ok(())
}

fn with_note(base: String, note: Option<&str>) -> String {
    match note.map(str::trim) {
        Some(note) if !note.is_empty() => format!("{}: {}", base, note),
        _ => base,
    }
}

fn credit(
    account: &mut Account,
    kind: EntryKind,
    amount: Decimal,
    note: String,
    operation: &str,
) -> Result<Decimal, LedgerError> {
    let new_balance = account
        .balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::arithmetic_overflow(operation, account.number))?;

    account.balance = new_balance;
    account
        .transactions
        .push(LedgerEntry::new(kind, amount, new_balance, note));
    Ok(new_balance)
}

fn debit(
    account: &mut Account,
    kind: EntryKind,
    amount: Decimal,
    note: String,
) -> Result<Decimal, LedgerError> {
    if account.balance < amount {
        return Err(LedgerError::insufficient_funds(
            account.number,
            account.balance,
            amount,
        ));
    }
    // amount <= balance, so the result is never negative
    let new_balance = account.balance - amount;

    account.balance = new_balance;
    account
        .transactions
        .push(LedgerEntry::new(kind, amount, new_balance, note));
    Ok(new_balance)
}
