//! Payment card types
//!
//! A card is split into a public view ([`Card`]) that may be listed freely and
//! the sensitive [`CardSecrets`] (full number and security code). Both halves
//! are kept together in [`IssuedCard`], which only ever lives inside the
//! owning account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card type requested at issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    Debit,
    Credit,
}

impl CardType {
    pub fn as_str(self) -> &'static str {
        match self {
            CardType::Debit => "DEBIT",
            CardType::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = String;

    /// Parse a card type case-insensitively (`"debit"`, `"CREDIT"`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBIT" => Ok(CardType::Debit),
            "CREDIT" => Ok(CardType::Credit),
            _ => Err(format!("unknown card type '{}'", s)),
        }
    }
}

/// Card status
///
/// Only `Active` is produced by current operations; `Blocked` is accepted
/// when loading snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardStatus {
    Active,
    Blocked,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CardStatus::Active => "ACTIVE",
            CardStatus::Blocked => "BLOCKED",
        })
    }
}

/// Public view of a payment card, safe to include in listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Generated unique identifier (UUID v4)
    pub id: String,
    /// Display form of the number, e.g. `**** **** **** 1234`
    pub masked: String,
    /// Expiry as `MM/YY`
    pub expiry: String,
    pub card_type: CardType,
    pub status: CardStatus,
}

/// Sensitive card fields
///
/// Only reachable through an authenticated account access.
#[derive(Clone, PartialEq, Eq)]
pub struct CardSecrets {
    /// Full 16-digit card number
    pub number: String,
    /// Three-digit security code
    pub security_code: String,
}

impl fmt::Debug for CardSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSecrets")
            .field("number", &mask_card_number(&self.number))
            .field("security_code", &"***")
            .finish()
    }
}

/// A card as held by its owning account: public view plus secrets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCard {
    pub card: Card,
    pub secrets: CardSecrets,
}

/// Mask a card number for display
///
/// All but the last four characters are replaced by a fixed placeholder.
/// Numbers shorter than eight characters are returned unchanged. Lengths count
/// characters, so a malformed number loaded from a snapshot never splits a
/// multi-byte character.
pub fn mask_card_number(digits: &str) -> String {
    let length = digits.chars().count();
    if length < 8 {
        return digits.to_string();
    }
    let last_four: String = digits.chars().skip(length - 4).collect();
    format!("**** **** **** {}", last_four)
}
