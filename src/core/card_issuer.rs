//! Synthetic payment card generation
//!
//! Cards issued here are demo records only: the number is random digits behind
//! a fixed brand digit and is never routed to a card network.

use crate::types::{mask_card_number, Card, CardSecrets, CardStatus, CardType, IssuedCard};
use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;

/// Leading digit of every generated card number (Visa-like prefix)
pub const CARD_BRAND_DIGIT: char = '4';

/// Total digits in a generated card number
pub const CARD_NUMBER_LENGTH: usize = 16;

/// Years of validity from the date of issue
pub const CARD_VALIDITY_YEARS: i32 = 4;

/// Issue a new active card dated today
pub fn issue_card(card_type: CardType) -> IssuedCard {
    issue_card_with(card_type, &mut rand::thread_rng(), Local::now().date_naive())
}

/// Issue a new active card from an explicit random source and issue date
pub fn issue_card_with<R: Rng + ?Sized>(
    card_type: CardType,
    rng: &mut R,
    issued_on: NaiveDate,
) -> IssuedCard {
    let number = generate_card_number(rng);
    let security_code = format!("{:03}", rng.gen_range(100..1000));

    IssuedCard {
        card: Card {
            id: uuid::Uuid::new_v4().to_string(),
            masked: mask_card_number(&number),
            expiry: expiry_from(issued_on),
            card_type,
            status: CardStatus::Active,
        },
        secrets: CardSecrets {
            number,
            security_code,
        },
    }
}

fn generate_card_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut number = String::with_capacity(CARD_NUMBER_LENGTH);
    number.push(CARD_BRAND_DIGIT);
    for _ in 1..CARD_NUMBER_LENGTH {
        number.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    number
}

/// `MM/YY` of the issue month, `CARD_VALIDITY_YEARS` later
fn expiry_from(issued_on: NaiveDate) -> String {
    let year = issued_on.year() + CARD_VALIDITY_YEARS;
    format!("{:02}/{:02}", issued_on.month(), year.rem_euclid(100))
}
