//! Error types for the bank ledger
//!
//! This module defines the errors a ledger operation can report to its caller
//! and the persistence errors raised by snapshot stores.
//!
//! # Error Categories
//!
//! - **Validation Errors**: invalid input, non-positive amounts, unknown accounts
//! - **Balance Errors**: insufficient funds, arithmetic overflow
//! - **Authentication Errors**: wrong password on login or password change
//! - **Persistence Errors**: snapshot read/write failures (never returned by a
//!   committed mutation, see [`crate::core::Durability`])

use super::transaction::AccountNumber;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned by ledger operations
///
/// Every variant is reported before any state is changed, so a failed
/// operation always leaves the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Malformed or missing input, such as an empty name or a negative
    /// opening balance
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong with the input
        message: String,
    },

    /// Transaction amount is zero or negative
    #[error("Invalid amount {amount} for {operation}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that rejected it
        operation: String,
    },

    /// Account number is not held by any live account
    #[error("Account {account} not found")]
    NotFound {
        /// The unknown account number
        account: AccountNumber,
    },

    /// Card id is not issued to the account
    #[error("Card {card_id} not found on account {account}")]
    CardNotFound {
        account: AccountNumber,
        card_id: String,
    },

    /// Debit exceeds the current balance
    #[error(
        "Insufficient funds for account {account}: balance {balance}, requested {requested}"
    )]
    InsufficientFunds {
        account: AccountNumber,
        balance: Decimal,
        requested: Decimal,
    },

    /// Login password does not match the stored digest
    #[error("Invalid credentials for account {account}")]
    InvalidCredentials { account: AccountNumber },

    /// Access token was issued before the account's password changed or
    /// before the account was closed
    #[error("Access to account {account} has been revoked, authenticate again")]
    AccessRevoked { account: AccountNumber },

    /// Current password supplied to a password change does not match
    #[error("Current password does not match for account {account}")]
    WrongCurrentPassword { account: AccountNumber },

    /// Every account number in the generation range is taken
    #[error("No free account numbers left ({live} accounts open)")]
    CapacityExhausted {
        /// Number of live accounts at the time of the request
        live: usize,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        operation: String,
        account: AccountNumber,
    },
}

impl LedgerError {
    /// Create an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(account: AccountNumber) -> Self {
        LedgerError::NotFound { account }
    }

    /// Create a CardNotFound error
    pub fn card_not_found(account: AccountNumber, card_id: &str) -> Self {
        LedgerError::CardNotFound {
            account,
            card_id: card_id.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountNumber, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountNumber) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }
}

/// Error raised while reading or writing a snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem error
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot content could not be encoded or decoded
    #[error("Snapshot format error: {0}")]
    Format(#[from] serde_json::Error),

    /// Snapshot decoded but holds a value the ledger cannot represent
    #[error("Invalid snapshot record for account {account}: {message}")]
    InvalidRecord {
        account: AccountNumber,
        message: String,
    },
}

// The temp file is dropped (and deleted) by `PersistError`; only the cause matters
impl From<tempfile::PersistError> for PersistenceError {
    fn from(error: tempfile::PersistError) -> Self {
        PersistenceError::Io(error.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case::invalid_input(
        LedgerError::InvalidInput { message: "name must not be empty".to_string() },
        "Invalid input: name must not be empty"
    )]
    #[case::invalid_amount(
        LedgerError::InvalidAmount { amount: dec!(-5), operation: "deposit".to_string() },
        "Invalid amount -5 for deposit"
    )]
    #[case::not_found(
        LedgerError::NotFound { account: 4242 },
        "Account 4242 not found"
    )]
    #[case::card_not_found(
        LedgerError::CardNotFound { account: 1001, card_id: "abc".to_string() },
        "Card abc not found on account 1001"
    )]
    #[case::insufficient_funds(
        LedgerError::InsufficientFunds { account: 1001, balance: dec!(5000), requested: dec!(6000) },
        "Insufficient funds for account 1001: balance 5000, requested 6000"
    )]
    #[case::invalid_credentials(
        LedgerError::InvalidCredentials { account: 1001 },
        "Invalid credentials for account 1001"
    )]
    #[case::access_revoked(
        LedgerError::AccessRevoked { account: 1001 },
        "Access to account 1001 has been revoked, authenticate again"
    )]
    #[case::wrong_current_password(
        LedgerError::WrongCurrentPassword { account: 1002 },
        "Current password does not match for account 1002"
    )]
    #[case::capacity_exhausted(
        LedgerError::CapacityExhausted { live: 9000 },
        "No free account numbers left (9000 accounts open)"
    )]
    #[case::arithmetic_overflow(
        LedgerError::ArithmeticOverflow { operation: "deposit".to_string(), account: 1001 },
        "Arithmetic overflow in deposit for account 1001"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_input(
        LedgerError::invalid_input("negative balance"),
        LedgerError::InvalidInput { message: "negative balance".to_string() }
    )]
    #[case::invalid_amount(
        LedgerError::invalid_amount(dec!(0), "withdraw"),
        LedgerError::InvalidAmount { amount: dec!(0), operation: "withdraw".to_string() }
    )]
    #[case::not_found(LedgerError::not_found(7), LedgerError::NotFound { account: 7 })]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds(1, dec!(10), dec!(20)),
        LedgerError::InsufficientFunds { account: 1, balance: dec!(10), requested: dec!(20) }
    )]
    fn test_helper_functions(#[case] result: LedgerError, #[case] expected: LedgerError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: PersistenceError = io_error.into();
        assert!(matches!(error, PersistenceError::Io(_)));
        assert_eq!(error.to_string(), "Snapshot I/O error: Permission denied");
    }
}
