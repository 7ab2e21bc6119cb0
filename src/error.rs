//! Error taxonomy shared by every stage of the savings pipeline

use rust_decimal::Decimal;

/// Failure raised by the contribution builder, rule resolver, or returns engine
///
/// Structural problems with already-built transactions never show up here:
/// the validator reports them as reasons on its `invalid` partition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SavingsError {
    /// Expense amount is not positive or reaches the amount limit
    #[error("invalid amount {amount}: must be greater than 0 and less than {limit}")]
    InvalidAmount { amount: Decimal, limit: Decimal },

    /// Timestamp text that is not a recognised date-time
    #[error("invalid timestamp {value:?}")]
    InvalidTimestamp { value: String },

    /// Negative age, wage, or inflation rate
    #[error("invalid profile: {field} {reason}")]
    InvalidProfile { field: &'static str, reason: String },

    /// Negative projection horizon
    #[error("invalid horizon: {years} years")]
    InvalidHorizon { years: Decimal },

    /// Malformed q/p/k rule
    #[error("invalid {class} period #{index}: {reason}")]
    InvalidPeriod {
        class: &'static str,
        index: usize,
        reason: String,
    },

    /// Decimal arithmetic left the representable range
    #[error("calculation overflow in {stage}")]
    CalculationOverflow { stage: &'static str },

    /// Expense or rule file could not be read
    #[error("failed to load input: {0}")]
    Load(String),

    /// Environment override that does not parse
    #[error("invalid configuration {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

impl SavingsError {
    /// Stable machine-readable code for outer boundaries
    pub fn code(&self) -> &'static str {
        match self {
            SavingsError::InvalidAmount { .. } => "INVALID_AMOUNT",
            SavingsError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            SavingsError::InvalidProfile { .. } => "INVALID_PROFILE",
            SavingsError::InvalidHorizon { .. } => "INVALID_HORIZON",
            SavingsError::InvalidPeriod { .. } => "INVALID_PERIOD",
            SavingsError::CalculationOverflow { .. } => "CALCULATION_OVERFLOW",
            SavingsError::Load(_) => "LOAD_FAILED",
            SavingsError::Config { .. } => "INVALID_CONFIG",
        }
    }
}

impl From<csv::Error> for SavingsError {
    fn from(err: csv::Error) -> Self {
        SavingsError::Load(err.to_string())
    }
}

impl From<std::io::Error> for SavingsError {
    fn from(err: std::io::Error) -> Self {
        SavingsError::Load(err.to_string())
    }
}

pub type SavingsResult<T> = Result<T, SavingsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            SavingsError::InvalidAmount { amount: dec!(0), limit: dec!(500000) },
            SavingsError::InvalidTimestamp { value: "x".into() },
            SavingsError::InvalidProfile { field: "age", reason: "is negative".into() },
            SavingsError::InvalidHorizon { years: dec!(-1) },
            SavingsError::InvalidPeriod { class: "q", index: 0, reason: "start after end".into() },
            SavingsError::CalculationOverflow { stage: "projection" },
            SavingsError::Load("missing".into()),
            SavingsError::Config { key: "RETIREMENT_AGE", reason: "not a number".into() },
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_names_field() {
        let err = SavingsError::InvalidProfile {
            field: "wage",
            reason: "must not be negative".into(),
        };
        assert_eq!(err.to_string(), "invalid profile: wage must not be negative");
    }
}
