//! Progressive income tax slabs used to price the NPS deduction

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Marginal `rate` applied to income above `lower`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub lower: Decimal,
    pub rate: Decimal,
}

/// Ordered slab table, lowest threshold first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub slabs: Vec<TaxSlab>,
}

impl Default for TaxSchedule {
    /// 0-7L: 0%, 7-10L: 10%, 10-12L: 15%, 12-15L: 20%, above 15L: 30%
    fn default() -> Self {
        Self {
            slabs: vec![
                TaxSlab { lower: dec!(0), rate: dec!(0) },
                TaxSlab { lower: dec!(700000), rate: dec!(0.10) },
                TaxSlab { lower: dec!(1000000), rate: dec!(0.15) },
                TaxSlab { lower: dec!(1200000), rate: dec!(0.20) },
                TaxSlab { lower: dec!(1500000), rate: dec!(0.30) },
            ],
        }
    }
}

impl TaxSchedule {
    /// Tax owed on `income`
    pub fn tax(&self, income: Decimal) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut owed = Decimal::ZERO;
        for (i, slab) in self.slabs.iter().enumerate() {
            if income <= slab.lower {
                break;
            }
            let upper = self
                .slabs
                .get(i + 1)
                .map(|next| next.lower.min(income))
                .unwrap_or(income);
            owed += (upper - slab.lower) * slab.rate;
        }
        owed
    }

    /// Tax saved by deducting `deduction` from `income`
    pub fn saving(&self, income: Decimal, deduction: Decimal) -> Decimal {
        self.tax(income) - self.tax(income - deduction)
    }
}
