//! Time-bounded rule definitions: q overrides, p extras, k windows

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{SavingsError, SavingsResult};
use crate::timestamp::flexible;
use crate::transactions::MAX_AMOUNT;

/// Anything bounded by an inclusive `[start, end]` interval
pub trait Period {
    fn start(&self) -> NaiveDateTime;
    fn end(&self) -> NaiveDateTime;

    /// Inclusive on both ends
    fn contains(&self, at: NaiveDateTime) -> bool {
        self.start() <= at && at <= self.end()
    }
}

/// q rule: replaces the remanent with `fixed` inside the interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverridePeriod {
    pub fixed: Decimal,
    #[serde(with = "flexible")]
    pub start: NaiveDateTime,
    #[serde(with = "flexible")]
    pub end: NaiveDateTime,
}

/// p rule: adds `extra` to the remanent inside the interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPeriod {
    pub extra: Decimal,
    #[serde(with = "flexible")]
    pub start: NaiveDateTime,
    #[serde(with = "flexible")]
    pub end: NaiveDateTime,
}

/// k window: effective remanents inside it are summed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregationWindow {
    #[serde(with = "flexible")]
    pub start: NaiveDateTime,
    #[serde(with = "flexible")]
    pub end: NaiveDateTime,
}

macro_rules! impl_period {
    ($($ty:ty),*) => {
        $(impl Period for $ty {
            fn start(&self) -> NaiveDateTime {
                self.start
            }

            fn end(&self) -> NaiveDateTime {
                self.end
            }
        })*
    };
}

impl_period!(OverridePeriod, ExtraPeriod, AggregationWindow);

/// The full rule set supplied with one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub q: Vec<OverridePeriod>,
    #[serde(default)]
    pub p: Vec<ExtraPeriod>,
    #[serde(default)]
    pub k: Vec<AggregationWindow>,
}

impl RuleSet {
    /// Reject intervals that end before they start and values at or over the amount limit
    pub fn validate(&self) -> SavingsResult<()> {
        for (index, rule) in self.q.iter().enumerate() {
            check_interval("q", index, rule)?;
            check_value("q", index, rule.fixed)?;
        }
        for (index, rule) in self.p.iter().enumerate() {
            check_interval("p", index, rule)?;
            check_value("p", index, rule.extra)?;
        }
        for (index, window) in self.k.iter().enumerate() {
            check_interval("k", index, window)?;
        }
        Ok(())
    }
}

fn check_interval(class: &'static str, index: usize, period: &impl Period) -> SavingsResult<()> {
    if period.start() > period.end() {
        return Err(SavingsError::InvalidPeriod {
            class,
            index,
            reason: format!("start {} is after end {}", period.start(), period.end()),
        });
    }
    Ok(())
}

fn check_value(class: &'static str, index: usize, value: Decimal) -> SavingsResult<()> {
    if value >= MAX_AMOUNT {
        return Err(SavingsError::InvalidPeriod {
            class,
            index,
            reason: format!("value {} must be less than {}", value, MAX_AMOUNT),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;
    use rust_decimal_macros::dec;

    fn window(start: &str, end: &str) -> AggregationWindow {
        AggregationWindow {
            start: parse_timestamp(start).unwrap(),
            end: parse_timestamp(end).unwrap(),
        }
    }

    #[test]
    fn test_contains_is_inclusive() {
        let k = window("2023-03-01T00:00:00", "2023-11-30T23:59:00");
        assert!(k.contains(k.start));
        assert!(k.contains(k.end));
        assert!(!k.contains(parse_timestamp("2023-11-30T23:59:01").unwrap()));
        assert!(!k.contains(parse_timestamp("2023-02-28T23:59:59").unwrap()));
    }

    #[test]
    fn test_rule_set_from_json() {
        let json = r#"{
            "q": [{"fixed": 0, "start": "2023-07-01 00:00:00", "end": "2023-07-31 23:59:00"}],
            "p": [{"extra": 25, "start": "2023-10-01T08:00:00", "end": "2023-12-31T19:59:00"}]
        }"#;
        let rules: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.q[0].fixed, dec!(0));
        assert_eq!(rules.p[0].extra, dec!(25));
        assert!(rules.k.is_empty());
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_reversed_window_rejected() {
        let rules = RuleSet {
            k: vec![window("2023-12-01T00:00:00", "2023-01-01T00:00:00")],
            ..Default::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(matches!(err, SavingsError::InvalidPeriod { class: "k", index: 0, .. }));
    }

    #[test]
    fn test_oversized_extra_rejected() {
        let k = window("2023-01-01T00:00:00", "2023-12-31T00:00:00");
        let rules = RuleSet {
            p: vec![ExtraPeriod { extra: dec!(500000), start: k.start, end: k.end }],
            ..Default::default()
        };
        assert_eq!(rules.validate().unwrap_err().code(), "INVALID_PERIOD");
    }
}
