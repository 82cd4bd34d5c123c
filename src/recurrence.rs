//! Recurrence rules of repeating events
//!
//! A rule is written as a small iCalendar block (`DTSTART`, `DTEND` and `RRULE` lines), as expected in a `<gd:recurrence>` element

use std::fmt::{Display, Formatter};
use std::io::BufReader;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use ical::property::Property;
use serde::{Deserialize, Serialize};

use crate::datetime::{self, DateInput, TimeInput};
use crate::error::{Error, Result};

/// How often an event repeats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 7] = [
        Frequency::Secondly, Frequency::Minutely, Frequency::Hourly, Frequency::Daily,
        Frequency::Weekly, Frequency::Monthly, Frequency::Yearly,
    ];

    /// The canonical (upper-case) name
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Secondly => "SECONDLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Frequency::ALL.iter()
            .find(|freq| freq.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| {
                let legal: Vec<&str> = Frequency::ALL.iter().map(|f| f.as_str()).collect();
                Error::Validation(format!("frequency must be one of {}, got {:?}", legal.join(" "), s))
            })
    }
}


/// The repeating pattern of an event.
///
/// `start` and `end` bound the first occurrence (hence give the duration of every occurrence).
/// Every setter validates its input, and leaves the rule unchanged when it fails.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecurrenceRule {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    frequency: Option<Frequency>,
    day_of_week: Option<Vec<String>>,
    repeat_until: Option<NaiveDate>,
    all_day: bool,
}

impl RecurrenceRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<&DateTime<Utc>>   { self.start.as_ref() }
    pub fn end(&self) -> Option<&DateTime<Utc>>     { self.end.as_ref() }
    pub fn frequency(&self) -> Option<Frequency>    { self.frequency }
    pub fn day_of_week(&self) -> Option<&[String]>  { self.day_of_week.as_deref() }
    pub fn repeat_until(&self) -> Option<&NaiveDate> { self.repeat_until.as_ref() }
    pub fn all_day(&self) -> bool                   { self.all_day }

    pub fn set_start<T: Into<TimeInput>>(&mut self, start: T) -> Result<()> {
        self.start = Some(start.into().resolve("recurrence start")?);
        Ok(())
    }

    pub fn set_end<T: Into<TimeInput>>(&mut self, end: T) -> Result<()> {
        self.end = Some(end.into().resolve("recurrence end")?);
        Ok(())
    }

    /// Set the frequency by its (case-insensitive) name, e.g. `"weekly"`
    pub fn set_frequency(&mut self, name: &str) -> Result<()> {
        self.frequency = Some(name.parse()?);
        Ok(())
    }

    /// Set the days an event repeats on, as two-letter codes (`MO`, `TU`...). This is only written out for weekly rules
    pub fn set_day_of_week<I, S>(&mut self, codes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(|s| s.into()).collect();
        if let Some(invalid) = codes.iter().find(|code| code.chars().count() != 2) {
            return Err(Error::Validation(format!("day of week must be a list of two-letter day names, got {:?}", invalid)));
        }
        self.day_of_week = Some(codes);
        Ok(())
    }

    /// Set the last day (inclusive) an event can repeat on
    pub fn set_repeat_until<D: Into<DateInput>>(&mut self, date: D) -> Result<()> {
        self.repeat_until = Some(date.into().resolve("repeat until")?);
        Ok(())
    }

    pub fn set_all_day(&mut self, all_day: bool) {
        self.all_day = all_day;
    }

    /// Write this rule as an iCalendar block. `DTSTART` and `DTEND` are mandatory
    pub fn render(&self) -> Result<String> {
        let start = self.start.as_ref()
            .ok_or_else(|| Error::Validation(String::from("a recurrence needs a start")))?;
        let end = self.end.as_ref()
            .ok_or_else(|| Error::Validation(String::from("a recurrence needs an end")))?;

        let mut output = String::new();
        output.push_str(&self.render_bound("DTSTART", start));
        output.push_str(&self.render_bound("DTEND", end));

        if let Some(frequency) = self.frequency {
            output.push_str(&format!("RRULE:FREQ={}", frequency));
            if let (Frequency::Weekly, Some(days)) = (frequency, &self.day_of_week) {
                output.push_str(&format!(";BYDAY={}", days.join(",")));
            }
            if let Some(until) = &self.repeat_until {
                output.push_str(&format!(";UNTIL={}", datetime::format_compact_date(until)));
            }
            output.push('\n');
        }
        Ok(output)
    }

    fn render_bound(&self, name: &str, instant: &DateTime<Utc>) -> String {
        if self.all_day {
            format!("{};VALUE=DATE:{}\n", name, datetime::format_compact_date(&instant.date_naive()))
        } else {
            format!("{};VALUE=DATE-TIME:{}\n", name, datetime::format_compact(instant))
        }
    }

    /// Read a block back, as written by [`Self::render`] or by the server.
    ///
    /// Time zone definitions (`VTIMEZONE` blocks) and unknown properties are skipped. `TZID`s are not resolved: times are taken as UTC
    pub fn parse(text: &str) -> Result<Self> {
        let mut rule = Self::new();
        let mut nesting = 0usize;

        for property in ical::PropertyParser::from_reader(BufReader::new(text.as_bytes())) {
            let property = property
                .map_err(|err| Error::MalformedResponse(format!("invalid recurrence: {}", err)))?;
            let name = property.name.to_uppercase();
            let value = property.value.clone().unwrap_or_default();
            match name.as_str() {
                "BEGIN" => nesting += 1,
                "END" => nesting = nesting.saturating_sub(1),
                _ if nesting > 0 => continue,
                "DTSTART" => {
                    rule.all_day = is_date_only(&property, &value);
                    rule.start = Some(parse_bound(&value)?);
                },
                "DTEND" => {
                    rule.end = Some(parse_bound(&value)?);
                },
                "RRULE" => rule.apply_rrule(&value)?,
                other => log::debug!("Ignoring recurrence property {}", other),
            }
        }

        if rule.start.is_none() {
            return Err(Error::MalformedResponse(String::from("recurrence without DTSTART")));
        }
        Ok(rule)
    }

    fn apply_rrule(&mut self, value: &str) -> Result<()> {
        for part in value.split(';') {
            let mut kv = part.splitn(2, '=');
            let key = kv.next().unwrap_or("").trim().to_uppercase();
            let val = kv.next().unwrap_or("").trim();
            match key.as_str() {
                "FREQ" => self.frequency = Some(val.parse()?),
                "BYDAY" => self.day_of_week = Some(val.split(',').map(|d| d.to_string()).collect()),
                "UNTIL" => {
                    let until = datetime::parse_compact_date(val)
                        .ok_or_else(|| Error::MalformedResponse(format!("invalid UNTIL {:?}", val)))?;
                    self.repeat_until = Some(until);
                },
                "" => continue,
                other => log::debug!("Ignoring recurrence rule part {}", other),
            }
        }
        Ok(())
    }
}

fn is_date_only(property: &Property, value: &str) -> bool {
    let declared_date = property.params.as_ref()
        .map(|params| params.iter().any(|(name, values)| {
            name.eq_ignore_ascii_case("VALUE") && values.iter().any(|v| v.eq_ignore_ascii_case("DATE"))
        }))
        .unwrap_or(false);
    declared_date || value.trim().len() == 8
}

fn parse_bound(value: &str) -> Result<DateTime<Utc>> {
    datetime::parse_compact(value)
        .ok_or_else(|| Error::MalformedResponse(format!("invalid recurrence date {:?}", value)))
}
