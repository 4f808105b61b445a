//! Human-readable date rendering in the fixed display timezone.
//!
//! Rendering is the only place a display timezone is applied. The instant
//! rendered for a key is always its UTC midnight.

use crate::calendar::date_key::CalendarKey;
use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ID_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];
const ID_MONTHS_LONG: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];
const ID_WEEKDAYS_SHORT: [&str; 7] = ["Min", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"];

const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_MONTHS_LONG: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const EN_WEEKDAYS_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Language used for month and weekday names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayLocale {
    #[default]
    Indonesian,
    English,
}

impl DisplayLocale {
    fn months_short(self) -> &'static [&'static str; 12] {
        match self {
            Self::Indonesian => &ID_MONTHS_SHORT,
            Self::English => &EN_MONTHS_SHORT,
        }
    }

    fn months_long(self) -> &'static [&'static str; 12] {
        match self {
            Self::Indonesian => &ID_MONTHS_LONG,
            Self::English => &EN_MONTHS_LONG,
        }
    }

    fn weekdays_short(self) -> &'static [&'static str; 7] {
        match self {
            Self::Indonesian => &ID_WEEKDAYS_SHORT,
            Self::English => &EN_WEEKDAYS_SHORT,
        }
    }
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" => Ok(Self::Indonesian),
            "en" | "en-gb" | "en-us" => Ok(Self::English),
            other => Err(format!("unsupported display locale `{other}`; expected id|en")),
        }
    }
}

impl Display for DisplayLocale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indonesian => write!(f, "id"),
            Self::English => write!(f, "en"),
        }
    }
}

/// Shape of a rendered date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
    /// `5 Jan 2024`
    Long,
    /// `5 Jan`
    DayMonth,
    /// `Jum`
    WeekdayShort,
    /// `Januari 2024`
    MonthYear,
}

/// Display timezone plus locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFormat {
    pub timezone: Tz,
    pub locale: DisplayLocale,
}

impl DisplayFormat {
    pub fn new(timezone: Tz, locale: DisplayLocale) -> Self {
        Self { timezone, locale }
    }

    /// Renders the UTC midnight of `key` as seen in the display timezone.
    pub fn render(&self, key: CalendarKey, style: DisplayStyle) -> String {
        let local = self.timezone.from_utc_datetime(&key.midnight().naive_utc());
        let month = local.month0() as usize;
        match style {
            DisplayStyle::Long => format!(
                "{} {} {}",
                local.day(),
                self.locale.months_short()[month],
                local.year()
            ),
            DisplayStyle::DayMonth => {
                format!("{} {}", local.day(), self.locale.months_short()[month])
            }
            DisplayStyle::WeekdayShort => self.locale.weekdays_short()
                [local.weekday().num_days_from_sunday() as usize]
                .to_string(),
            DisplayStyle::MonthYear => {
                format!("{} {}", self.locale.months_long()[month], local.year())
            }
        }
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Jakarta, DisplayLocale::Indonesian)
    }
}
