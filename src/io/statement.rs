//! CSV statement export
//!
//! Renders an account's transaction log as CSV with the columns
//! `date,type,amount,balanceAfter,note`. Amounts are written with two decimal
//! places, rounding half away from zero.

use std::io::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{LedgerEntry, TIMESTAMP_FORMAT};

/// Write a statement for the given entries
///
/// Entries are written in the order given, which for a ledger statement is the
/// order they were appended.
///
/// # Arguments
///
/// * `entries` - Transaction log entries, as returned by `Ledger::statement`
/// * `output` - Writer to send the CSV to
///
/// # Errors
///
/// Returns an error message if writing or flushing fails.
pub fn write_statement_csv(entries: &[LedgerEntry], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["date", "type", "amount", "balanceAfter", "note"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for entry in entries {
        writer
            .write_record(&[
                entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                entry.kind.as_str().to_string(),
                cents(entry.amount),
                cents(entry.balance_after),
                entry.note.clone(),
            ])
            .map_err(|e| format!("Failed to write statement entry: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

fn cents(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
