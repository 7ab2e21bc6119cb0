//! Expense round-ups and transaction validation

mod builder;
mod data;
pub mod loader;
mod validator;

pub use builder::{build_transaction, build_transactions, ceiling_of};
pub use data::{
    Expense, InvalidTransaction, Transaction, TransactionTotals, MAX_AMOUNT, ROUND_UP_UNIT,
};
pub use loader::{load_expenses, load_expenses_from_reader};
pub use validator::{structural_issues, validate_transactions, ValidationReport};
