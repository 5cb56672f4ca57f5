//! Timestamp handling
//!
//! Record envelopes carry `created`/`updated` as fixed-width RFC 3339 strings
//! with microsecond precision, so string order in the store matches time
//! order. Date-valued fields supplied by clients are strict RFC 3339 and are
//! written back in canonical form.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::types::RecordError;

/// Envelope timestamp, truncated to microseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(6))
    }

    /// Current time, but never earlier than `previous`.
    ///
    /// Keeps `updated` monotonic when the wall clock steps backwards.
    pub fn later_than(previous: Timestamp) -> Self {
        Self::now().max(previous)
    }

    pub fn parse(value: &str) -> Result<Self, RecordError> {
        parse_date(value).map(Self::from_datetime)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(de::Error::custom)
    }
}

/// Parse a client-supplied date. Only RFC 3339 is accepted.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, RecordError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| RecordError::Validation(format!("bad date: {value}")))
}

/// Parse an optional date field, treating an empty string as absent.
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, RecordError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_date(v).map(Some),
        _ => Ok(None),
    }
}

/// Canonical RFC 3339 form: UTC with `Z`, fractional seconds only when present.
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serde adapter for stored date fields (`#[serde(with = "crate::time::date")]`)
pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(de::Error::custom)
    }

    /// Same as the parent module for `Option<DateTime<Utc>>`
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_some(&format_date(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            parse_optional_date(raw.as_deref()).map_err(de::Error::custom)
        }
    }
}
