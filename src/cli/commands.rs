//! Command dispatch for the CLI
//!
//! Runs one parsed [`Command`] against a [`Ledger`] and prints a plain-text
//! result. Snapshot write failures do not fail a command; they are reported as
//! a warning line after the result.

use std::io::{self, Write};

use thiserror::Error;

use super::args::Command;
use crate::core::{Durability, Ledger, Outcome};
use crate::io::write_statement_csv;
use crate::types::{AccountSummary, Card, LedgerError};

/// Error returned by a CLI command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("{0}")]
    Statement(String),
}

/// Execute a command and write its result to `output`
///
/// # Errors
///
/// Returns the ledger's error if the operation was rejected, or an output
/// error if printing failed.
pub fn execute(
    ledger: &Ledger,
    command: Command,
    output: &mut dyn Write,
) -> Result<(), CommandError> {
    match command {
        Command::List => {
            for account in ledger.list() {
                writeln!(output, "{}", account_line(&account))?;
            }
        }
        Command::Show { account } => {
            write_account(output, &ledger.get(account)?)?;
        }
        Command::Open {
            name,
            balance,
            password,
        } => {
            let outcome = ledger.open(&name, balance, &password)?;
            writeln!(output, "Opened {}", account_line(&outcome.value))?;
            report_durability(output, &outcome)?;
        }
        Command::Deposit {
            account,
            amount,
            note,
        } => {
            let outcome = ledger.deposit(account, amount, &note)?;
            writeln!(output, "Balance {:.2}", outcome.value)?;
            report_durability(output, &outcome)?;
        }
        Command::Withdraw {
            account,
            amount,
            note,
        } => {
            let outcome = ledger.withdraw(account, amount, &note)?;
            writeln!(output, "Balance {:.2}", outcome.value)?;
            report_durability(output, &outcome)?;
        }
        Command::Interest { account } => {
            let outcome = ledger.add_interest(account)?;
            writeln!(output, "Balance {:.2}", outcome.value)?;
            report_durability(output, &outcome)?;
        }
        Command::Transfer {
            from,
            to,
            amount,
            note,
        } => {
            let outcome = ledger.transfer(from, to, amount, note.as_deref())?;
            writeln!(
                output,
                "{} balance {:.2}, {} balance {:.2}",
                from, outcome.value.from_balance, to, outcome.value.to_balance
            )?;
            report_durability(output, &outcome)?;
        }
        Command::Upi {
            account,
            upi_id,
            amount,
            note,
        } => {
            let outcome = ledger.upi_debit(account, &upi_id, amount, note.as_deref())?;
            writeln!(output, "Balance {:.2}", outcome.value)?;
            report_durability(output, &outcome)?;
        }
        Command::IssueCard { account, card_type } => {
            let outcome = ledger.issue_card(account, card_type)?;
            writeln!(output, "Issued {}", card_line(&outcome.value))?;
            report_durability(output, &outcome)?;
        }
        Command::Cards { account } => {
            for card in ledger.cards(account)? {
                writeln!(output, "{}", card_line(&card))?;
            }
        }
        Command::ChangePassword {
            account,
            current,
            new_password,
        } => {
            let outcome = ledger.change_password(account, &current, &new_password)?;
            writeln!(output, "Password changed")?;
            report_durability(output, &outcome)?;
        }
        Command::Close { account } => {
            let outcome = ledger.close(account)?;
            writeln!(output, "Closed {}", account_line(&outcome.value))?;
            report_durability(output, &outcome)?;
        }
        Command::Statement { account } => {
            let entries = ledger.statement(account)?;
            write_statement_csv(&entries, output).map_err(CommandError::Statement)?;
        }
        Command::Login {
            account,
            password,
            reveal_card,
        } => {
            let (access, summary) = ledger.authenticate(account, &password)?;
            write_account(output, &summary)?;
            if let Some(card_id) = reveal_card {
                let secrets = ledger.reveal_card(&access, &card_id)?;
                writeln!(
                    output,
                    "Card {}: number {} security code {}",
                    card_id, secrets.number, secrets.security_code
                )?;
            }
        }
    }
    Ok(())
}

fn account_line(account: &AccountSummary) -> String {
    format!(
        "{}\t{}\t{:.2}",
        account.number, account.name, account.balance
    )
}

fn card_line(card: &Card) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        card.id, card.masked, card.expiry, card.card_type, card.status
    )
}

fn write_account(output: &mut dyn Write, account: &AccountSummary) -> io::Result<()> {
    writeln!(output, "{}", account_line(account))?;
    for entry in &account.transactions {
        writeln!(
            output,
            "  {}\t{}\t{:.2}\t{:.2}\t{}",
            entry.timestamp.format(crate::types::TIMESTAMP_FORMAT),
            entry.kind,
            entry.amount,
            entry.balance_after,
            entry.note
        )?;
    }
    for card in &account.cards {
        writeln!(output, "  card {}", card_line(card))?;
    }
    Ok(())
}

fn report_durability<T>(output: &mut dyn Write, outcome: &Outcome<T>) -> io::Result<()> {
    if let Durability::NotPersisted { reason } = &outcome.durability {
        writeln!(output, "Warning: change is live but was not saved: {}", reason)?;
    }
    Ok(())
}
