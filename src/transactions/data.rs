//! Expense and transaction records

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{SavingsError, SavingsResult};
use crate::timestamp::flexible;

/// Round-up granularity: ceilings are multiples of this
pub const ROUND_UP_UNIT: Decimal = dec!(100);

/// Amounts, ceilings, remanents and rule values must stay strictly below this
pub const MAX_AMOUNT: Decimal = dec!(500000);

/// Raw expense as received from the caller, timestamp not yet parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub timestamp: String,
    pub amount: Decimal,
}

impl Expense {
    pub fn new(timestamp: impl Into<String>, amount: Decimal) -> Self {
        Self {
            timestamp: timestamp.into(),
            amount,
        }
    }
}

/// An expense enriched with its round-up contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the expense happened
    #[serde(with = "flexible", alias = "date")]
    pub timestamp: NaiveDateTime,

    /// Amount spent
    pub amount: Decimal,

    /// Next multiple of 100 strictly above the amount
    pub ceiling: Decimal,

    /// Contribution: ceiling - amount, or the rule-adjusted value after resolution
    pub remanent: Decimal,
}

impl Transaction {
    /// Copy of this transaction carrying a different remanent
    pub fn with_remanent(&self, remanent: Decimal) -> Self {
        Self {
            remanent,
            ..self.clone()
        }
    }
}

/// A transaction rejected by validation or filtering, with the reasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub message: String,
}

/// Column totals over a list of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTotals {
    pub total_amount: Decimal,
    pub total_ceiling: Decimal,
    pub total_remanent: Decimal,
}

impl TransactionTotals {
    pub fn of(transactions: &[Transaction]) -> Self {
        transactions.iter().fold(Self::default(), |mut acc, t| {
            acc.total_amount += t.amount;
            acc.total_ceiling += t.ceiling;
            acc.total_remanent += t.remanent;
            acc
        })
    }

    /// `of` for transactions that did not come out of the builder, so the
    /// column sums are unbounded
    pub fn checked_of(transactions: &[Transaction]) -> SavingsResult<Self> {
        let add = |a: Decimal, b: Decimal| {
            a.checked_add(b)
                .ok_or(SavingsError::CalculationOverflow { stage: "transaction totals" })
        };
        transactions.iter().try_fold(Self::default(), |acc, t| -> SavingsResult<Self> {
            Ok(Self {
                total_amount: add(acc.total_amount, t.amount)?,
                total_ceiling: add(acc.total_ceiling, t.ceiling)?,
                total_remanent: add(acc.total_remanent, t.remanent)?,
            })
        })
    }
}
