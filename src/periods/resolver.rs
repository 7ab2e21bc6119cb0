//! Temporal rule resolution
//!
//! Each transaction's remanent is recomputed in two steps:
//! 1. **q**: the matching override with the latest start replaces the remanent
//!    (equal starts: earliest in the list wins)
//! 2. **p**: every matching extra is added on top
//!
//! k windows then sum the effective remanents of the transactions they contain.

use chrono::NaiveDateTime;
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::data::{AggregationWindow, ExtraPeriod, OverridePeriod, Period, RuleSet};
use crate::error::{SavingsError, SavingsResult};
use crate::transactions::{InvalidTransaction, Transaction};

/// Sum of effective remanents for one k window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSum {
    #[serde(flatten)]
    pub window: AggregationWindow,
    pub sum: Decimal,
}

/// Output of `resolve_temporal_rules`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTransactions {
    /// Same order as the input, remanent replaced by its effective value
    pub transactions: Vec<Transaction>,

    /// One entry per k window, in window order
    pub aggregates: Vec<WindowSum>,
}

/// Output of `filter_transactions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    pub valid: Vec<Transaction>,
    pub invalid: Vec<InvalidTransaction>,
}

/// Pick the q rule that applies at `at`, if any.
///
/// Latest `start` wins. On equal starts the rule seen first is kept: a later
/// candidate must start strictly after the current best to replace it.
pub fn select_override(at: NaiveDateTime, q: &[OverridePeriod]) -> Option<&OverridePeriod> {
    let mut best: Option<&OverridePeriod> = None;

    for rule in q.iter().filter(|rule| rule.contains(at)) {
        let replaces = match best {
            None => true,
            Some(current) => rule.start > current.start,
        };
        if replaces {
            best = Some(rule);
        }
    }

    best
}

fn checked_sum(
    mut values: impl Iterator<Item = Decimal>,
    stage: &'static str,
) -> SavingsResult<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or(SavingsError::CalculationOverflow { stage })
    })
}

/// Sum of every p rule that applies at `at`
pub fn total_extra(at: NaiveDateTime, p: &[ExtraPeriod]) -> SavingsResult<Decimal> {
    checked_sum(
        p.iter().filter(|rule| rule.contains(at)).map(|rule| rule.extra),
        "p extras",
    )
}

/// Remanent after q replacement and p additions
pub fn effective_remanent(
    transaction: &Transaction,
    q: &[OverridePeriod],
    p: &[ExtraPeriod],
) -> SavingsResult<Decimal> {
    let base = select_override(transaction.timestamp, q)
        .map(|rule| rule.fixed)
        .unwrap_or(transaction.remanent);

    base.checked_add(total_extra(transaction.timestamp, p)?)
        .ok_or(SavingsError::CalculationOverflow { stage: "effective remanent" })
}

/// Sum effective remanents per k window (inclusive bounds)
pub fn aggregate_windows(
    transactions: &[Transaction],
    k: &[AggregationWindow],
) -> SavingsResult<Vec<WindowSum>> {
    k.iter()
        .map(|window| -> SavingsResult<WindowSum> {
            let sum = checked_sum(
                transactions
                    .iter()
                    .filter(|t| window.contains(t.timestamp))
                    .map(|t| t.remanent),
                "k window sum",
            )?;
            Ok(WindowSum { window: *window, sum })
        })
        .collect()
}

fn apply_rules(
    transactions: &[Transaction],
    q: &[OverridePeriod],
    p: &[ExtraPeriod],
) -> SavingsResult<Vec<Transaction>> {
    transactions
        .par_iter()
        .map(|t| effective_remanent(t, q, p).map(|remanent| t.with_remanent(remanent)))
        .collect()
}

/// Apply q then p to every transaction and aggregate the result over k.
///
/// Transactions outside every window still appear in the output. Empty rule
/// lists leave remanents untouched and produce no aggregates.
pub fn resolve_temporal_rules(
    transactions: &[Transaction],
    q: &[OverridePeriod],
    p: &[ExtraPeriod],
    k: &[AggregationWindow],
) -> SavingsResult<ResolvedTransactions> {
    let rules = RuleSet {
        q: q.to_vec(),
        p: p.to_vec(),
        k: k.to_vec(),
    };
    rules.validate()?;

    let resolved = apply_rules(transactions, q, p)?;
    let aggregates = aggregate_windows(&resolved, k)?;

    debug!(
        "resolved {} transactions against {} q, {} p, {} k rules",
        resolved.len(),
        q.len(),
        p.len(),
        k.len()
    );

    Ok(ResolvedTransactions {
        transactions: resolved,
        aggregates,
    })
}

/// Apply q then p and split on the sign of the effective remanent.
///
/// Invalid entries keep their original remanent so callers can see what
/// the rules did to them.
pub fn filter_transactions(
    transactions: &[Transaction],
    q: &[OverridePeriod],
    p: &[ExtraPeriod],
) -> SavingsResult<FilterReport> {
    let rules = RuleSet {
        q: q.to_vec(),
        p: p.to_vec(),
        k: Vec::new(),
    };
    rules.validate()?;

    let mut report = FilterReport::default();
    for (original, resolved) in transactions.iter().zip(apply_rules(transactions, q, p)?) {
        if resolved.remanent < Decimal::ZERO {
            report.invalid.push(InvalidTransaction {
                transaction: original.clone(),
                message: "remanent became negative after applying periods".to_string(),
            });
        } else {
            report.valid.push(resolved);
        }
    }

    debug!(
        "filtered {} transactions: {} valid, {} invalid",
        transactions.len(),
        report.valid.len(),
        report.invalid.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;
    use rust_decimal_macros::dec;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn tx(at: &str, amount: Decimal, ceiling: Decimal) -> Transaction {
        Transaction {
            timestamp: ts(at),
            amount,
            ceiling,
            remanent: ceiling - amount,
        }
    }

    fn q(fixed: Decimal, start: &str, end: &str) -> OverridePeriod {
        OverridePeriod { fixed, start: ts(start), end: ts(end) }
    }

    fn p(extra: Decimal, start: &str, end: &str) -> ExtraPeriod {
        ExtraPeriod { extra, start: ts(start), end: ts(end) }
    }

    fn k(start: &str, end: &str) -> AggregationWindow {
        AggregationWindow { start: ts(start), end: ts(end) }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2023-10-12T20:15:00", dec!(250), dec!(300)),
            tx("2023-02-28T15:49:00", dec!(375), dec!(400)),
            tx("2023-07-01T21:59:00", dec!(620), dec!(700)),
            tx("2023-12-17T08:09:00", dec!(480), dec!(500)),
        ]
    }

    #[test]
    fn test_sample_resolution() {
        let resolved = resolve_temporal_rules(
            &sample(),
            &[q(dec!(0), "2023-07-01T00:00:00", "2023-07-31T23:59:00")],
            &[p(dec!(25), "2023-10-01T08:00:00", "2023-12-31T19:59:00")],
            &[
                k("2023-03-01T00:00:00", "2023-11-30T23:59:00"),
                k("2023-01-01T00:00:00", "2023-12-31T23:59:00"),
            ],
        )
        .unwrap();

        let remanents: Vec<_> = resolved.transactions.iter().map(|t| t.remanent).collect();
        assert_eq!(remanents, vec![dec!(75), dec!(25), dec!(0), dec!(45)]);

        let sums: Vec<_> = resolved.aggregates.iter().map(|a| a.sum).collect();
        assert_eq!(sums, vec![dec!(75), dec!(145)]);
    }

    #[test]
    fn test_latest_start_wins() {
        let rules = vec![
            q(dec!(10), "2023-01-01T00:00:00", "2023-12-31T00:00:00"),
            q(dec!(20), "2023-06-01T00:00:00", "2023-06-30T00:00:00"),
            q(dec!(30), "2023-03-01T00:00:00", "2023-09-30T00:00:00"),
        ];
        let chosen = select_override(ts("2023-06-15T00:00:00"), &rules).unwrap();
        assert_eq!(chosen.fixed, dec!(20));
    }

    #[test]
    fn test_equal_start_first_in_list_wins() {
        let rules = vec![
            q(dec!(5), "2023-06-01T00:00:00", "2023-06-30T00:00:00"),
            q(dec!(7), "2023-06-01T00:00:00", "2023-12-31T00:00:00"),
        ];
        let chosen = select_override(ts("2023-06-15T00:00:00"), &rules).unwrap();
        assert_eq!(chosen.fixed, dec!(5));

        // Reordering flips the winner
        let reversed: Vec<_> = rules.into_iter().rev().collect();
        assert_eq!(select_override(ts("2023-06-15T00:00:00"), &reversed).unwrap().fixed, dec!(7));
    }

    #[test]
    fn test_extras_are_additive() {
        let t = tx("2023-05-05T12:00:00", dec!(130), dec!(200));
        let extras = vec![
            p(dec!(10), "2023-05-01T00:00:00", "2023-05-31T00:00:00"),
            p(dec!(15), "2023-01-01T00:00:00", "2023-12-31T00:00:00"),
            p(dec!(99), "2024-01-01T00:00:00", "2024-12-31T00:00:00"),
        ];
        assert_eq!(effective_remanent(&t, &[], &extras).unwrap(), dec!(95));
    }

    #[test]
    fn test_override_applies_before_extra() {
        let t = tx("2023-05-05T12:00:00", dec!(130), dec!(200));
        let result = effective_remanent(
            &t,
            &[q(dec!(40), "2023-05-01T00:00:00", "2023-05-31T00:00:00")],
            &[p(dec!(5), "2023-05-01T00:00:00", "2023-05-31T00:00:00")],
        )
        .unwrap();
        assert_eq!(result, dec!(45));
    }

    #[test]
    fn test_rule_boundaries_inclusive() {
        let t = tx("2023-07-31T23:59:00", dec!(620), dec!(700));
        let rules = [q(dec!(3), "2023-07-01T00:00:00", "2023-07-31T23:59:00")];
        assert_eq!(effective_remanent(&t, &rules, &[]).unwrap(), dec!(3));
    }

    #[test]
    fn test_window_edges_included() {
        let txs = vec![
            tx("2023-03-01T00:00:00", dec!(90), dec!(100)),
            tx("2023-03-31T00:00:00", dec!(80), dec!(100)),
            tx("2023-04-01T00:00:00", dec!(70), dec!(100)),
        ];
        let march = [k("2023-03-01T00:00:00", "2023-03-31T00:00:00")];
        let sums = aggregate_windows(&txs, &march).unwrap();
        assert_eq!(sums[0].sum, dec!(30));
    }

    #[test]
    fn test_empty_rules_are_identity() {
        let txs = sample();
        let resolved = resolve_temporal_rules(&txs, &[], &[], &[]).unwrap();
        assert_eq!(resolved.transactions, txs);
        assert!(resolved.aggregates.is_empty());
    }

    #[test]
    fn test_malformed_rule_fails() {
        let err = resolve_temporal_rules(
            &sample(),
            &[q(dec!(0), "2023-08-01T00:00:00", "2023-07-01T00:00:00")],
            &[],
            &[],
        )
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_PERIOD");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let q_rules = [q(dec!(1), "2023-01-01T00:00:00", "2023-12-31T00:00:00")];
        let p_rules = [p(dec!(2), "2023-06-01T00:00:00", "2023-12-31T00:00:00")];
        let k_rules = [k("2023-01-01T00:00:00", "2023-12-31T23:59:59")];
        let first = resolve_temporal_rules(&sample(), &q_rules, &p_rules, &k_rules).unwrap();
        let second = resolve_temporal_rules(&sample(), &q_rules, &p_rules, &k_rules).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filter_rejects_negative_remanent() {
        let report = filter_transactions(
            &sample(),
            &[],
            &[p(dec!(-60), "2023-10-01T00:00:00", "2023-10-31T00:00:00")],
        )
        .unwrap();
        assert_eq!(report.valid.len(), 3);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].transaction.remanent, dec!(50));
    }

    #[test]
    fn test_extreme_negative_extras_fail_instead_of_wrapping() {
        let rules = [
            p(Decimal::MIN, "2023-01-01T00:00:00", "2023-12-31T00:00:00"),
            p(Decimal::MIN, "2023-01-01T00:00:00", "2023-12-31T00:00:00"),
        ];
        let err = filter_transactions(&sample(), &[], &rules).unwrap_err();
        assert_eq!(err.code(), "CALCULATION_OVERFLOW");
    }

    #[test]
    fn test_window_sum_overflow_is_error() {
        let mut huge = tx("2023-03-10T00:00:00", dec!(1), dec!(100));
        huge.remanent = Decimal::MAX;
        let txs = vec![huge.clone(), huge];
        let march = [k("2023-03-01T00:00:00", "2023-03-31T00:00:00")];
        let err = aggregate_windows(&txs, &march).unwrap_err();
        assert!(matches!(err, SavingsError::CalculationOverflow { .. }));
    }
}
