//! # Temporal Types: UTC-Only Timestamps
//!
//! `Timestamp` backs the `issuedOn` and `expires` members of a credential.
//! Both are part of the hashed payload, so their string form must not vary
//! with the local timezone or sub-second clock precision.
//!
//! The wire form is always `YYYY-MM-DDTHH:MM:SSZ`. Strict parsing rejects any
//! other offset; `parse_lenient` converts any RFC 3339 offset to UTC.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BcertError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::parse()`]: from an ISO8601 string, rejecting non-UTC offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Parse an RFC 3339 string that ends in `Z`.
    ///
    /// Explicit offsets, including `+00:00`, are rejected so that a value read
    /// back from a credential re-serializes to the same bytes.
    pub fn parse(s: &str) -> Result<Self, BcertError> {
        if !s.ends_with('Z') {
            return Err(BcertError::InvalidTimestamp {
                input: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, BcertError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| BcertError::InvalidTimestamp {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = BcertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
    }

    #[test]
    fn test_parse_subseconds_truncated() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.123456Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-dateZ").is_err());
        assert!(Timestamp::parse("2026-01-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_parse_lenient_converts_offset() {
        let ts: Timestamp = "2026-01-15T17:00:00+05:00".parse().unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_is_iso8601_string() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-01-15T12:00:00Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn test_deserialize_rejects_offset() {
        assert!(serde_json::from_str::<Timestamp>("\"2026-01-15T12:00:00+01:00\"").is_err());
    }
}
