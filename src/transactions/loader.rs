//! Load raw expenses from CSV
//!
//! Expected columns: `timestamp,amount`. Timestamps stay as text here and
//! are parsed by the contribution builder.

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use std::path::Path;

use super::data::Expense;
use crate::error::SavingsResult;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    timestamp: String,
    amount: Decimal,
}

impl From<CsvRow> for Expense {
    fn from(row: CsvRow) -> Self {
        Expense {
            timestamp: row.timestamp,
            amount: row.amount,
        }
    }
}

/// Load all expenses from a CSV file
pub fn load_expenses<P: AsRef<Path>>(path: P) -> SavingsResult<Vec<Expense>> {
    let file = std::fs::File::open(path)?;
    load_expenses_from_reader(file)
}

/// Load expenses from any reader (e.g., string buffer, request body)
pub fn load_expenses_from_reader<R: std::io::Read>(reader: R) -> SavingsResult<Vec<Expense>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut expenses = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        expenses.push(row.into());
    }

    Ok(expenses)
}
