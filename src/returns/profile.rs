//! Investor and fund profiles

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{SavingsError, SavingsResult};

/// NPS annual return (7.11%)
pub const NPS_ANNUAL_RATE: Decimal = dec!(0.0711);

/// Index fund annual return (14.49%)
pub const INDEX_ANNUAL_RATE: Decimal = dec!(0.1449);

/// Deduction cap as a fraction of annual wage
pub const TAX_BENEFIT_WAGE_FRACTION: Decimal = dec!(0.10);

/// Absolute deduction cap
pub const TAX_BENEFIT_ABSOLUTE_CAP: Decimal = dec!(200000);

/// The person whose contributions are projected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorProfile {
    pub age: i32,
    pub annual_wage: Decimal,
    pub inflation_rate: Decimal,
}

impl InvestorProfile {
    pub fn new(age: i32, annual_wage: Decimal, inflation_rate: Decimal) -> Self {
        Self {
            age,
            annual_wage,
            inflation_rate,
        }
    }

    /// Reject negative age, wage, or inflation
    pub fn validate(&self) -> SavingsResult<()> {
        if self.age < 0 {
            return Err(SavingsError::InvalidProfile {
                field: "age",
                reason: format!("must not be negative (got {})", self.age),
            });
        }
        if self.annual_wage < Decimal::ZERO {
            return Err(SavingsError::InvalidProfile {
                field: "annual_wage",
                reason: format!("must not be negative (got {})", self.annual_wage),
            });
        }
        if self.inflation_rate < Decimal::ZERO {
            return Err(SavingsError::InvalidProfile {
                field: "inflation_rate",
                reason: format!("must not be negative (got {})", self.inflation_rate),
            });
        }
        Ok(())
    }
}

/// Which standing fund to project into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundKind {
    Nps,
    Index,
}

/// Fixed-rate fund with an optional deduction rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundProfile {
    pub kind: FundKind,
    pub annual_rate: Decimal,
    pub has_tax_benefit: bool,
    pub tax_benefit_cap_fraction_of_wage: Decimal,
    pub tax_benefit_absolute_cap: Decimal,
}

impl FundProfile {
    /// National Pension Scheme: 7.11%, deduction up to 10% of wage or 200000
    pub fn nps() -> Self {
        Self {
            kind: FundKind::Nps,
            annual_rate: NPS_ANNUAL_RATE,
            has_tax_benefit: true,
            tax_benefit_cap_fraction_of_wage: TAX_BENEFIT_WAGE_FRACTION,
            tax_benefit_absolute_cap: TAX_BENEFIT_ABSOLUTE_CAP,
        }
    }

    /// Index fund: 14.49%, no deduction
    pub fn index() -> Self {
        Self {
            kind: FundKind::Index,
            annual_rate: INDEX_ANNUAL_RATE,
            has_tax_benefit: false,
            tax_benefit_cap_fraction_of_wage: TAX_BENEFIT_WAGE_FRACTION,
            tax_benefit_absolute_cap: TAX_BENEFIT_ABSOLUTE_CAP,
        }
    }

    /// Same fund at a different annual rate
    pub fn with_rate(mut self, annual_rate: Decimal) -> Self {
        self.annual_rate = annual_rate;
        self
    }

    /// Deductible amount: min(principal, fraction * wage, absolute cap).
    ///
    /// Zero for funds without the benefit.
    pub fn eligible_deduction(&self, principal: Decimal, annual_wage: Decimal) -> Decimal {
        if !self.has_tax_benefit {
            return Decimal::ZERO;
        }

        principal
            .min(self.tax_benefit_cap_fraction_of_wage * annual_wage)
            .min(self.tax_benefit_absolute_cap)
            .max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_profiles() {
        let nps = FundProfile::nps();
        assert_eq!(nps.annual_rate, dec!(0.0711));
        assert!(nps.has_tax_benefit);

        let index = FundProfile::index();
        assert_eq!(index.annual_rate, dec!(0.1449));
        assert!(!index.has_tax_benefit);
    }

    #[test]
    fn test_deduction_caps() {
        let nps = FundProfile::nps();
        // Principal is the binding cap
        assert_eq!(nps.eligible_deduction(dec!(1000), dec!(600000)), dec!(1000));
        // 10% of wage binds
        assert_eq!(nps.eligible_deduction(dec!(90000), dec!(600000)), dec!(60000));
        // Absolute cap binds
        assert_eq!(nps.eligible_deduction(dec!(400000), dec!(5000000)), dec!(200000));
        // No benefit on the index fund
        assert_eq!(FundProfile::index().eligible_deduction(dec!(1000), dec!(600000)), dec!(0));
    }

    #[test]
    fn test_profile_validation() {
        assert!(InvestorProfile::new(30, dec!(600000), dec!(0.05)).validate().is_ok());
        assert!(InvestorProfile::new(0, dec!(0), dec!(0)).validate().is_ok());

        let cases = [
            (InvestorProfile::new(-1, dec!(1), dec!(0)), "age"),
            (InvestorProfile::new(30, dec!(-1), dec!(0)), "annual_wage"),
            (InvestorProfile::new(30, dec!(1), dec!(-0.01)), "inflation_rate"),
        ];
        for (profile, expected) in cases {
            match profile.validate() {
                Err(SavingsError::InvalidProfile { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidProfile for {}, got {:?}", expected, other),
            }
        }
    }
}
