//! Retirement Auto-Save - round-up micro-investment engine
//!
//! This library provides:
//! - Contribution building (round each expense up to the next 100)
//! - Transaction validation (valid / invalid / duplicate partitions)
//! - Temporal rule resolution (q overrides, p extras, k aggregation windows)
//! - Returns projection into NPS and index funds with tax and inflation adjustments

pub mod config;
pub mod error;
pub mod periods;
pub mod returns;
pub mod timestamp;
pub mod transactions;

// Re-export commonly used types
pub use config::ReturnsConfig;
pub use error::{SavingsError, SavingsResult};
pub use periods::{filter_transactions, resolve_temporal_rules, RuleSet};
pub use returns::{project_returns, FundKind, FundProfile, InvestorProfile, ReturnsEngine};
pub use transactions::{build_transactions, validate_transactions, Expense, Transaction};
