//! Date-time parsing for expense and rule timestamps

use chrono::{DateTime, NaiveDateTime};

use crate::error::{SavingsError, SavingsResult};

/// Accepted naive layouts, tried in order
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp in ISO-like form or RFC 3339.
///
/// Offsets are converted to UTC and then dropped so that every timestamp in
/// a request compares on the same naive timeline.
pub fn parse_timestamp(value: &str) -> SavingsResult<NaiveDateTime> {
    let trimmed = value.trim();

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc())
        .map_err(|_| SavingsError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Serde adapter so request types accept every layout `parse_timestamp` does
pub mod flexible {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(OUTPUT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
