//! Calendar-date keys and conversions between instants and UTC days.
//!
//! # Responsibility
//! - Own the canonical `YYYY-MM-DD` key format used by storage and callers.
//! - Convert between absolute instants and UTC calendar days.
//!
//! # Invariants
//! - Storage truth is the UTC calendar day; display timezones never take part
//!   in key computation.
//! - Day arithmetic is performed on the UTC-midnight instant, not on
//!   calendar fields.
//! - `CalendarKey::from_str(&key.to_string()) == Ok(key)` for every key.

use crate::calendar::display::{DisplayFormat, DisplayLocale, DisplayStyle};
use crate::clock::Clock;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const KEY_FORMAT: &str = "%Y-%m-%d";

static KEY_PATTERN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date key regex"));

/// Errors from calendar key parsing and day arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Input does not match `YYYY-MM-DD` or is not a real calendar date.
    InvalidDateFormat(String),
    /// A span was requested whose end precedes its start.
    InvalidRange { from: String, to: String },
    /// Day arithmetic left the representable date range.
    OutOfRange(String),
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateFormat(value) => {
                write!(f, "invalid date `{value}`; expected a real date as YYYY-MM-DD")
            }
            Self::InvalidRange { from, to } => {
                write!(f, "invalid date range: {to} is before {from}")
            }
            Self::OutOfRange(value) => write!(f, "date arithmetic out of range from {value}"),
        }
    }
}

impl Error for DateError {}

/// One UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarKey(NaiveDate);

impl CalendarKey {
    /// Wraps an already-valid date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// UTC calendar day containing `instant`.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    /// Current UTC day according to `clock`.
    pub fn today(clock: &impl Clock) -> Self {
        Self::from_instant(clock.now())
    }

    /// Parses a strict `YYYY-MM-DD` key.
    pub fn parse(value: &str) -> Result<Self, DateError> {
        if !KEY_PATTERN_RE.is_match(value) {
            return Err(DateError::InvalidDateFormat(value.to_string()));
        }
        NaiveDate::parse_from_str(value, KEY_FORMAT)
            .map(Self)
            .map_err(|_| DateError::InvalidDateFormat(value.to_string()))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// UTC midnight instant that starts this day.
    pub fn midnight(self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// Shifts by `days` through the UTC-midnight instant.
    pub fn add_days(self, days: i64) -> Result<Self, DateError> {
        TimeDelta::try_days(days)
            .and_then(|delta| self.midnight().checked_add_signed(delta))
            .map(Self::from_instant)
            .ok_or_else(|| DateError::OutOfRange(self.to_string()))
    }

    /// 1-based day of the month.
    pub fn day_of_month(self) -> u32 {
        self.0.day()
    }

    /// First day of this key's month.
    pub fn first_of_month(self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }
}

impl Display for CalendarKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for CalendarKey {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonical key for the UTC day containing `timestamp`.
pub fn to_calendar_key(timestamp: DateTime<Utc>) -> String {
    CalendarKey::from_instant(timestamp).to_string()
}

/// UTC midnight for `key`.
///
/// # Errors
/// - `InvalidDateFormat` when `key` is not a strict, real `YYYY-MM-DD` date.
pub fn from_calendar_key(key: &str) -> Result<DateTime<Utc>, DateError> {
    CalendarKey::parse(key).map(CalendarKey::midnight)
}

/// Key `days` before (negative) or after (positive) `key`.
pub fn add_days(key: &str, days: i64) -> Result<String, DateError> {
    CalendarKey::parse(key)?
        .add_days(days)
        .map(|shifted| shifted.to_string())
}

/// Current UTC calendar key.
pub fn today(clock: &impl Clock) -> String {
    CalendarKey::today(clock).to_string()
}

/// Human-readable long date for `key` in `timezone`, e.g. `5 Jan 2024`.
///
/// Always uses the default Indonesian month names. Use
/// `DisplayFormat::render` to follow a configured locale.
pub fn to_display(key: &str, timezone: Tz) -> Result<String, DateError> {
    let key = CalendarKey::parse(key)?;
    Ok(DisplayFormat::new(timezone, DisplayLocale::Indonesian).render(key, DisplayStyle::Long))
}
