//! Time primitives used by temporal filters and extents.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A GML time primitive: an instant or a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeValue {
    Instant(DateTime<FixedOffset>),
    Period {
        begin: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

impl TimeValue {
    /// Parse an ISO 8601 instant or a `begin/end` period.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();
        if let Some((begin, end)) = s.split_once('/') {
            let begin = parse_instant(begin)?;
            let end = parse_instant(end)?;
            if end < begin {
                return Err(TimeParseError::InvertedPeriod(s.to_string()));
            }
            return Ok(TimeValue::Period { begin, end });
        }
        Ok(TimeValue::Instant(parse_instant(s)?))
    }

    /// Build a period from GML `beginPosition`/`endPosition` texts.
    pub fn period(begin: &str, end: &str) -> Result<Self, TimeParseError> {
        Self::parse(&format!("{}/{}", begin.trim(), end.trim()))
    }

    pub fn is_period(&self) -> bool {
        matches!(self, TimeValue::Period { .. })
    }

    /// KVP form: the instant, or `begin/end`.
    pub fn to_kvp_string(&self) -> String {
        match self {
            TimeValue::Instant(t) => format_instant(t),
            TimeValue::Period { begin, end } => {
                format!("{}/{}", format_instant(begin), format_instant(end))
            }
        }
    }
}

/// Parse an ISO 8601 instant. Values without an offset are taken as UTC;
/// a bare date means midnight UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    let utc = FixedOffset::east_opt(0).ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))?;

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt).with_timezone(&utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt).with_timezone(&utc));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Format an instant as RFC 3339 with `Z` for UTC and only the fractional
/// digits the value needs.
pub fn format_instant(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Period ends before it begins: {0}")]
    InvertedPeriod(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_instant() {
        let value = TimeValue::parse("2012-11-19T13:00:00Z").unwrap();
        match value {
            TimeValue::Instant(t) => {
                assert_eq!(t.year(), 2012);
                assert_eq!(t.hour(), 13);
            }
            _ => panic!("Expected instant"),
        }
        assert_eq!(value.to_kvp_string(), "2012-11-19T13:00:00Z");
    }

    #[test]
    fn test_parse_period() {
        let value = TimeValue::parse("2012-11-19T13:00:00Z/2012-11-19T14:00:00+01:00").unwrap();
        assert!(value.is_period());
        assert_eq!(
            value.to_kvp_string(),
            "2012-11-19T13:00:00Z/2012-11-19T14:00:00+01:00"
        );
    }

    #[test]
    fn test_naive_and_date_only_are_utc() {
        let naive = parse_instant("2012-11-19T13:00:00").unwrap();
        assert_eq!(format_instant(&naive), "2012-11-19T13:00:00Z");
        let date = parse_instant("2012-11-19").unwrap();
        assert_eq!(format_instant(&date), "2012-11-19T00:00:00Z");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            TimeValue::parse("yesterday"),
            Err(TimeParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            TimeValue::parse("2012-11-20T00:00:00Z/2012-11-19T00:00:00Z"),
            Err(TimeParseError::InvertedPeriod(_))
        ));
    }
}
