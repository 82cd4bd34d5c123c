//! Conversions between user-supplied times and their wire representations

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{Error, Result};

/// An instant given by a caller: either already parsed, or as a timestamp string to be parsed
#[derive(Clone, Debug, PartialEq)]
pub enum TimeInput {
    Instant(DateTime<Utc>),
    Text(String),
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(dt: DateTime<Utc>) -> Self { TimeInput::Instant(dt) }
}
impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(dt: DateTime<FixedOffset>) -> Self { TimeInput::Instant(dt.with_timezone(&Utc)) }
}
impl From<&str> for TimeInput {
    fn from(s: &str) -> Self { TimeInput::Text(s.to_string()) }
}
impl From<String> for TimeInput {
    fn from(s: String) -> Self { TimeInput::Text(s) }
}

impl TimeInput {
    /// Turn this input into an instant. `what` names the value in error messages
    pub fn resolve(self, what: &str) -> Result<DateTime<Utc>> {
        match self {
            TimeInput::Instant(dt) => Ok(dt),
            TimeInput::Text(s) => parse_timestamp(&s)
                .ok_or_else(|| Error::Validation(format!("{} must be a date or a time, got {:?}", what, s))),
        }
    }
}


/// A calendar date given by a caller: either already parsed, or as a `YYYY-MM-DD` string
#[derive(Clone, Debug, PartialEq)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self { DateInput::Date(d) }
}
impl From<&str> for DateInput {
    fn from(s: &str) -> Self { DateInput::Text(s.to_string()) }
}
impl From<String> for DateInput {
    fn from(s: String) -> Self { DateInput::Text(s) }
}

impl DateInput {
    pub fn resolve(self, what: &str) -> Result<NaiveDate> {
        match self {
            DateInput::Date(d) => Ok(d),
            DateInput::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| Error::Validation(format!("{} must be a date, got {:?}", what, s))),
        }
    }
}


/// Parse a timestamp as found in feeds or given by users.
///
/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates (midnight UTC)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// The timestamp format of `startTime`/`endTime` attributes
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `20240101T090000`, the compact UTC form used in recurrence blocks
pub fn format_compact(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// `20240101`
pub fn format_compact_date(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse the compact forms produced by [`format_compact`] and [`format_compact_date`] (a trailing `Z` is allowed)
pub fn parse_compact(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim().trim_end_matches('Z');
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    parse_compact_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..8)?;
    NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_time_input() {
        let expected = Utc.ymd(2024, 1, 1).and_hms(9, 0, 0);
        assert_eq!(TimeInput::from("2024-01-01T09:00:00Z").resolve("start").unwrap(), expected);
        assert_eq!(TimeInput::from("2024-01-01T10:00:00+01:00").resolve("start").unwrap(), expected);
        assert_eq!(TimeInput::from("2024-01-01 09:00:00").resolve("start").unwrap(), expected);
        assert_eq!(TimeInput::from(expected).resolve("start").unwrap(), expected);

        assert!(matches!(TimeInput::from("next tuesday").resolve("start"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_date_input() {
        assert_eq!(DateInput::from("2024-06-01").resolve("until").unwrap(), NaiveDate::from_ymd(2024, 6, 1));
        assert!(DateInput::from("2024-06-01T10:00:00Z").resolve("until").is_err());
    }

    #[test]
    fn test_compact_forms() {
        let dt = Utc.ymd(2024, 1, 1).and_hms(9, 0, 0);
        assert_eq!(format_compact(&dt), "20240101T090000");
        assert_eq!(parse_compact("20240101T090000Z"), Some(dt));
        assert_eq!(parse_compact_date("20240601T000000Z"), Some(NaiveDate::from_ymd(2024, 6, 1)));
        assert_eq!(format_timestamp(&dt), "2024-01-01T09:00:00.000Z");
    }
}
