//! Temporal rules (q overrides, p extras, k aggregation windows) and their resolution

mod data;
mod resolver;

pub use data::{AggregationWindow, ExtraPeriod, OverridePeriod, Period, RuleSet};
pub use resolver::{
    aggregate_windows, effective_remanent, filter_transactions, resolve_temporal_rules,
    select_override, total_extra, FilterReport, ResolvedTransactions, WindowSum,
};
