//! Transaction validator: partitions transactions into valid, invalid, and duplicate
//!
//! Classification is total: every input lands in exactly one partition and
//! nothing here returns an error.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::builder::ceiling_of;
use super::data::{InvalidTransaction, Transaction, MAX_AMOUNT, ROUND_UP_UNIT};

/// Three-way split of a transaction list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: Vec<Transaction>,
    pub invalid: Vec<InvalidTransaction>,
    pub duplicate: Vec<Transaction>,
}

impl ValidationReport {
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len() + self.duplicate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reasons a transaction is structurally inconsistent, empty if it is sound
pub fn structural_issues(t: &Transaction) -> Vec<String> {
    let mut issues = Vec::new();

    if t.amount <= Decimal::ZERO {
        issues.push("amount must be greater than 0".to_string());
    }
    if t.amount >= MAX_AMOUNT {
        issues.push(format!("amount must be less than {}", MAX_AMOUNT));
    }
    if t.ceiling >= MAX_AMOUNT {
        issues.push(format!("ceiling must be less than {}", MAX_AMOUNT));
    }
    if t.remanent >= MAX_AMOUNT {
        issues.push(format!("remanent must be less than {}", MAX_AMOUNT));
    }

    // The next-multiple check only makes sense inside the amount range
    let amount_in_range = t.amount > Decimal::ZERO && t.amount < MAX_AMOUNT;
    if !(t.ceiling % ROUND_UP_UNIT).is_zero() {
        issues.push(format!("ceiling {} is not a multiple of {}", t.ceiling, ROUND_UP_UNIT));
    } else if amount_in_range && t.ceiling != ceiling_of(t.amount) {
        issues.push(format!(
            "ceiling must be the next multiple of {} above amount {} (expected {})",
            ROUND_UP_UNIT,
            t.amount,
            ceiling_of(t.amount)
        ));
    }

    match t.ceiling.checked_sub(t.amount) {
        Some(expected) if expected != t.remanent => issues.push(format!(
            "remanent must equal ceiling - amount (expected {})",
            expected
        )),
        Some(_) => {}
        None => issues.push("ceiling - amount is out of range".to_string()),
    }

    issues
}

/// Partition transactions into valid, invalid and duplicate.
///
/// Only structurally sound transactions take part in duplicate detection:
/// the first `(timestamp, amount)` occurrence is valid and later ones are
/// duplicates. A repeated invalid transaction is reported as invalid each time.
pub fn validate_transactions(transactions: &[Transaction]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen: HashSet<(NaiveDateTime, Decimal)> = HashSet::new();

    for t in transactions {
        let issues = structural_issues(t);
        if !issues.is_empty() {
            report.invalid.push(InvalidTransaction {
                transaction: t.clone(),
                message: issues.join("; "),
            });
            continue;
        }

        // Decimal hashes by value, so 250 and 250.00 collide as intended
        if seen.insert((t.timestamp, t.amount)) {
            report.valid.push(t.clone());
        } else {
            report.duplicate.push(t.clone());
        }
    }

    debug!(
        "validated {} transactions: {} valid, {} invalid, {} duplicate",
        transactions.len(),
        report.valid.len(),
        report.invalid.len(),
        report.duplicate.len()
    );

    report
}
