//! Per-window savings report

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::engine::ProjectedReturns;
use super::profile::FundKind;
use crate::periods::WindowSum;
use crate::timestamp::flexible;

/// Decimal places for reported money
pub const REPORT_DECIMALS: u32 = 2;

/// Round to `REPORT_DECIMALS`, midpoint away from zero
pub fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(REPORT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Savings accumulated in one k window and what they grow into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSavings {
    #[serde(with = "flexible")]
    pub start: NaiveDateTime,
    #[serde(with = "flexible")]
    pub end: NaiveDateTime,

    /// Sum of effective remanents in the window
    pub amount: Decimal,

    /// Nominal value at retirement
    pub future_value: Decimal,

    /// Value at retirement in today's money
    pub real_value: Decimal,

    /// real_value - amount
    pub profits: Decimal,

    /// Eligible deduction
    pub tax_benefit: Decimal,

    /// Tax saved by the deduction
    pub tax_saving: Decimal,
}

impl WindowSavings {
    pub fn new(window_sum: WindowSum, projected: ProjectedReturns) -> Self {
        Self {
            start: window_sum.window.start,
            end: window_sum.window.end,
            amount: window_sum.sum,
            future_value: projected.future_value,
            real_value: projected.inflation_adjusted_value,
            profits: projected.inflation_adjusted_value - window_sum.sum,
            tax_benefit: projected.tax_benefit,
            tax_saving: projected.tax_saving,
        }
    }

    /// Copy with every money field rounded for display
    pub fn rounded(&self) -> Self {
        Self {
            start: self.start,
            end: self.end,
            amount: money(self.amount),
            future_value: money(self.future_value),
            real_value: money(self.real_value),
            profits: money(self.profits),
            tax_benefit: money(self.tax_benefit),
            tax_saving: money(self.tax_saving),
        }
    }
}

/// Result of running the returns pipeline for one fund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsReport {
    pub fund: FundKind,

    /// Compounding horizon used for every window
    pub years: u32,

    #[serde(rename = "transactionsTotalAmount")]
    pub total_amount: Decimal,

    #[serde(rename = "transactionsTotalCeiling")]
    pub total_ceiling: Decimal,

    #[serde(rename = "savingsByDates")]
    pub savings: Vec<WindowSavings>,
}

impl ReturnsReport {
    /// Copy with every money field rounded for display
    pub fn rounded(&self) -> Self {
        Self {
            fund: self.fund,
            years: self.years,
            total_amount: money(self.total_amount),
            total_ceiling: money(self.total_ceiling),
            savings: self.savings.iter().map(WindowSavings::rounded).collect(),
        }
    }
}
