//! Returns configuration: retirement horizon policy, fund constants, tax slabs
//!
//! Defaults carry the standing constants. `from_env` lets a deployment
//! override them without touching the projection code:
//!   RETIREMENT_AGE, POST_RETIREMENT_YEARS, NPS_ANNUAL_RATE, INDEX_ANNUAL_RATE

use std::env;
use std::str::FromStr;

use crate::error::{SavingsError, SavingsResult};
use crate::returns::{FundProfile, TaxSchedule};

/// Default retirement age
pub const DEFAULT_RETIREMENT_AGE: u32 = 60;

/// Horizon used for investors already at or past retirement age
pub const DEFAULT_POST_RETIREMENT_YEARS: u32 = 5;

/// Upper bound for `RETIREMENT_AGE` and `POST_RETIREMENT_YEARS`
pub const MAX_CONFIGURED_YEARS: u32 = 120;

/// Configuration for the returns engine
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsConfig {
    pub retirement_age: u32,
    pub post_retirement_years: u32,
    pub nps: FundProfile,
    pub index: FundProfile,
    pub tax: TaxSchedule,
}

impl Default for ReturnsConfig {
    fn default() -> Self {
        Self {
            retirement_age: DEFAULT_RETIREMENT_AGE,
            post_retirement_years: DEFAULT_POST_RETIREMENT_YEARS,
            nps: FundProfile::nps(),
            index: FundProfile::index(),
            tax: TaxSchedule::default(),
        }
    }
}

impl ReturnsConfig {
    /// Defaults overridden by whichever environment variables are set
    pub fn from_env() -> SavingsResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SavingsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(age) = parse_var(&lookup, "RETIREMENT_AGE")? {
            config.retirement_age = check_years("RETIREMENT_AGE", age)?;
        }
        if let Some(years) = parse_var(&lookup, "POST_RETIREMENT_YEARS")? {
            config.post_retirement_years = check_years("POST_RETIREMENT_YEARS", years)?;
        }
        if let Some(rate) = parse_var(&lookup, "NPS_ANNUAL_RATE")? {
            config.nps = config.nps.with_rate(rate);
        }
        if let Some(rate) = parse_var(&lookup, "INDEX_ANNUAL_RATE")? {
            config.index = config.index.with_rate(rate);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> SavingsResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| SavingsError::Config {
                key,
                reason: format!("{:?}: {}", raw, e),
            }),
    }
}

fn check_years(key: &'static str, years: u32) -> SavingsResult<u32> {
    if years > MAX_CONFIGURED_YEARS {
        return Err(SavingsError::Config {
            key,
            reason: format!("{} exceeds {} years", years, MAX_CONFIGURED_YEARS),
        });
    }
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ReturnsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ReturnsConfig::default());
        assert_eq!(config.retirement_age, 60);
        assert_eq!(config.nps.annual_rate, dec!(0.0711));
    }

    #[test]
    fn test_overrides() {
        let config = ReturnsConfig::from_lookup(lookup(&[
            ("RETIREMENT_AGE", "65"),
            ("INDEX_ANNUAL_RATE", "0.12"),
        ]))
        .unwrap();
        assert_eq!(config.retirement_age, 65);
        assert_eq!(config.index.annual_rate, dec!(0.12));
        assert!(!config.index.has_tax_benefit);
        assert_eq!(config.nps.annual_rate, dec!(0.0711));
    }

    #[test]
    fn test_unparseable_override_is_error() {
        let err = ReturnsConfig::from_lookup(lookup(&[("NPS_ANNUAL_RATE", "seven")])).unwrap_err();
        assert!(matches!(err, SavingsError::Config { key: "NPS_ANNUAL_RATE", .. }));
    }

    #[test]
    fn test_runaway_year_overrides_rejected() {
        let err = ReturnsConfig::from_lookup(lookup(&[("RETIREMENT_AGE", "600")])).unwrap_err();
        assert!(matches!(err, SavingsError::Config { key: "RETIREMENT_AGE", .. }));

        let err =
            ReturnsConfig::from_lookup(lookup(&[("POST_RETIREMENT_YEARS", "121")])).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");

        let config = ReturnsConfig::from_lookup(lookup(&[("RETIREMENT_AGE", "120")])).unwrap();
        assert_eq!(config.retirement_age, 120);
    }
}
