//! Contribution builder: expense -> transaction with ceiling and remanent

use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;

use super::data::{Expense, Transaction, MAX_AMOUNT, ROUND_UP_UNIT};
use crate::error::{SavingsError, SavingsResult};
use crate::timestamp::parse_timestamp;

/// Next multiple of 100 strictly above `amount`.
///
/// An amount that already sits on a multiple moves up a full unit, so the
/// remanent is never zero.
pub fn ceiling_of(amount: Decimal) -> Decimal {
    let steps = (amount / ROUND_UP_UNIT).floor();
    (steps + Decimal::ONE) * ROUND_UP_UNIT
}

/// Build a single transaction from a raw expense
pub fn build_transaction(expense: &Expense) -> SavingsResult<Transaction> {
    let amount = expense.amount;
    if amount <= Decimal::ZERO || amount >= MAX_AMOUNT {
        return Err(SavingsError::InvalidAmount {
            amount,
            limit: MAX_AMOUNT,
        });
    }

    let timestamp = parse_timestamp(&expense.timestamp)?;
    let ceiling = ceiling_of(amount);

    Ok(Transaction {
        timestamp,
        amount,
        ceiling,
        remanent: ceiling - amount,
    })
}

/// Build transactions for every expense, preserving input order.
///
/// Fails if any expense is malformed. With several bad expenses, which one
/// is reported is unspecified.
pub fn build_transactions(expenses: &[Expense]) -> SavingsResult<Vec<Transaction>> {
    let transactions = expenses
        .par_iter()
        .map(build_transaction)
        .collect::<SavingsResult<Vec<_>>>()?;

    debug!("built {} transactions", transactions.len());
    Ok(transactions)
}
