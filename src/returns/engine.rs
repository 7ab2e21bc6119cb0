//! Returns projection: annual compounding, deduction, inflation adjustment

use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use super::profile::{FundKind, FundProfile, InvestorProfile};
use super::report::{ReturnsReport, WindowSavings};
use crate::config::ReturnsConfig;
use crate::error::{SavingsError, SavingsResult};
use crate::periods::{aggregate_windows, filter_transactions, RuleSet};
use crate::transactions::{Transaction, TransactionTotals};

/// Projected value of a contribution at retirement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedReturns {
    /// Nominal value after compounding
    pub future_value: Decimal,

    /// Eligible deduction on the principal (zero for funds without the benefit)
    pub tax_benefit: Decimal,

    /// Income tax saved by that deduction under the configured slabs
    pub tax_saving: Decimal,

    /// Future value in today's money
    pub inflation_adjusted_value: Decimal,
}

/// `(1 + rate)^years`, annual discrete compounding.
///
/// Whole years use exponentiation by squaring; fractional years fall back
/// to `powd`. `None` when the factor leaves the `Decimal` range.
pub fn growth_factor(rate: Decimal, years: Decimal) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(rate)?;

    if years.fract().is_zero() {
        if let Some(whole) = years.to_u64() {
            return compound_whole_years(base, whole);
        }
    }

    base.checked_powd(years)
}

fn compound_whole_years(mut base: Decimal, mut exp: u64) -> Option<Decimal> {
    let mut acc = Decimal::ONE;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.checked_mul(base)?;
        }
        exp >>= 1;
        // Squaring past the last bit could overflow for nothing
        if exp > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(acc)
}

/// Main returns engine, carrying fund constants and the retirement horizon policy
#[derive(Debug, Clone, Default)]
pub struct ReturnsEngine {
    config: ReturnsConfig,
}

impl ReturnsEngine {
    pub fn new(config: ReturnsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReturnsConfig {
        &self.config
    }

    /// Standing profile for `kind` with the configured rate
    pub fn fund(&self, kind: FundKind) -> &FundProfile {
        match kind {
            FundKind::Nps => &self.config.nps,
            FundKind::Index => &self.config.index,
        }
    }

    /// Years left until the configured retirement age.
    ///
    /// Investors at or past retirement age get `post_retirement_years`.
    pub fn years_to_retirement(&self, age: i32) -> u32 {
        let retirement_age = self.config.retirement_age as i32;
        if age >= retirement_age {
            debug!(
                "age {} at or past retirement age {}, using {} years",
                age, retirement_age, self.config.post_retirement_years
            );
            return self.config.post_retirement_years;
        }
        (retirement_age - age.max(0)) as u32
    }

    /// Project `principal` into `fund` over `horizon_years`
    pub fn project(
        &self,
        principal: Decimal,
        investor: &InvestorProfile,
        fund: &FundProfile,
        horizon_years: Decimal,
    ) -> SavingsResult<ProjectedReturns> {
        investor.validate()?;
        if horizon_years < Decimal::ZERO {
            return Err(SavingsError::InvalidHorizon { years: horizon_years });
        }

        let future_value = growth_factor(fund.annual_rate, horizon_years)
            .and_then(|factor| principal.checked_mul(factor))
            .ok_or(SavingsError::CalculationOverflow { stage: "future value" })?;
        let inflation_adjusted_value = growth_factor(investor.inflation_rate, horizon_years)
            .and_then(|factor| future_value.checked_div(factor))
            .ok_or(SavingsError::CalculationOverflow { stage: "inflation adjustment" })?;

        let tax_benefit = fund.eligible_deduction(principal, investor.annual_wage);
        let tax_saving = if fund.has_tax_benefit {
            self.config.tax.saving(investor.annual_wage, tax_benefit)
        } else {
            Decimal::ZERO
        };

        Ok(ProjectedReturns {
            future_value,
            tax_benefit,
            tax_saving,
            inflation_adjusted_value,
        })
    }

    /// Full returns pipeline for one fund.
    ///
    /// Applies q and p, drops transactions whose effective remanent went
    /// negative, sums the rest per k window, then projects each window to
    /// retirement. Totals cover the kept transactions only.
    pub fn savings_by_windows(
        &self,
        investor: &InvestorProfile,
        kind: FundKind,
        rules: &RuleSet,
        transactions: &[Transaction],
    ) -> SavingsResult<ReturnsReport> {
        investor.validate()?;
        rules.validate()?;

        let fund = self.fund(kind);
        let filtered = filter_transactions(transactions, &rules.q, &rules.p)?;
        if !filtered.invalid.is_empty() {
            warn!(
                "{} transactions dropped with negative remanent",
                filtered.invalid.len()
            );
        }

        let totals = TransactionTotals::checked_of(&filtered.valid)?;
        let years = self.years_to_retirement(investor.age);
        let horizon = Decimal::from(years);

        let savings = aggregate_windows(&filtered.valid, &rules.k)?
            .into_iter()
            .map(|window_sum| -> SavingsResult<WindowSavings> {
                let projected = self.project(window_sum.sum, investor, fund, horizon)?;
                Ok(WindowSavings::new(window_sum, projected))
            })
            .collect::<SavingsResult<Vec<_>>>()?;

        debug!(
            "{:?} projection over {} years for {} windows",
            kind,
            years,
            savings.len()
        );

        Ok(ReturnsReport {
            fund: kind,
            years,
            total_amount: totals.total_amount,
            total_ceiling: totals.total_ceiling,
            savings,
        })
    }
}

/// Project with the default configuration
pub fn project_returns(
    principal: Decimal,
    investor: &InvestorProfile,
    fund: &FundProfile,
    horizon_years: Decimal,
) -> SavingsResult<ProjectedReturns> {
    ReturnsEngine::default().project(principal, investor, fund, horizon_years)
}

/// Project into NPS (7.11%, deduction enabled)
pub fn project_nps_returns(
    principal: Decimal,
    investor: &InvestorProfile,
    horizon_years: Decimal,
) -> SavingsResult<ProjectedReturns> {
    project_returns(principal, investor, &FundProfile::nps(), horizon_years)
}

/// Project into the index fund (14.49%, no deduction)
pub fn project_index_returns(
    principal: Decimal,
    investor: &InvestorProfile,
    horizon_years: Decimal,
) -> SavingsResult<ProjectedReturns> {
    project_returns(principal, investor, &FundProfile::index(), horizon_years)
}
