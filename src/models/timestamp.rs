//! Timestamp parsing at the ingestion boundary.
//!
//! The backend emits ISO-8601 strings in several shapes (`2024-01-10`,
//! `2024-01-10T08:00:00`, `2024-01-10T08:00:00.123+00:00`, `...Z`). Every
//! shape is parsed into a `DateTime<Utc>` so plan-expiry comparisons never
//! depend on string formatting. Values that cannot be parsed are treated as
//! absent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offset-less date-times are read as UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional, leniently-parsed timestamps.
///
/// Use with `#[serde(default, with = "crate::models::timestamp::lenient")]`.
pub mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_only_is_midnight_utc() {
        let parsed = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-01-15T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_zulu_and_fraction() {
        let parsed = parse_timestamp("2024-01-15T10:00:00.250Z").unwrap();
        assert_eq!(parsed.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let parsed = parse_timestamp("2024-01-15T10:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("next tuesday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn test_mixed_formats_compare_by_instant() {
        // Lexicographically "2024-01-10" < "2024-01-10T00:00:00+05:00", but as
        // instants the offset one is five hours earlier.
        let date_only = parse_timestamp("2024-01-10").unwrap();
        let with_offset = parse_timestamp("2024-01-10T00:00:00+05:00").unwrap();
        assert!(with_offset < date_only);
    }
}
