//! Half-open UTC windows over calendar days.
//!
//! # Invariants
//! - Windows are `[start, end)`; `end` is the UTC midnight after the last day.
//! - A timestamp `t` belongs to day `k` iff `DayWindow::day(k).contains(t)`.

use crate::calendar::date_key::{CalendarKey, DateError};
use chrono::{DateTime, Utc};

/// Absolute-timestamp interval covering one or more whole UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window of exactly one day.
    pub fn day(key: CalendarKey) -> Self {
        Self {
            start: key.midnight(),
            end: next_midnight(key),
        }
    }

    /// Window covering `from..=to_inclusive`.
    pub fn span(from: CalendarKey, to_inclusive: CalendarKey) -> Result<Self, DateError> {
        if to_inclusive < from {
            return Err(DateError::InvalidRange {
                from: from.to_string(),
                to: to_inclusive.to_string(),
            });
        }
        Ok(Self {
            start: from.midnight(),
            end: next_midnight(to_inclusive),
        })
    }

    /// The `days` days ending with `today`, inclusive. `days` is clamped to at
    /// least one.
    pub fn lookback(today: CalendarKey, days: u32) -> Result<Self, DateError> {
        let first = today.add_days(-(i64::from(days.max(1)) - 1))?;
        Self::span(first, today)
    }

    /// From the first day of `today`'s month through `today`.
    pub fn month_to_date(today: CalendarKey) -> Self {
        Self {
            start: today.first_of_month().midnight(),
            end: next_midnight(today),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn next_midnight(key: CalendarKey) -> DateTime<Utc> {
    key.date()
        .succ_opt()
        .map(|next| CalendarKey::from_date(next).midnight())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Window for the single day `key`.
pub fn day_range(key: &str) -> Result<DayWindow, DateError> {
    CalendarKey::parse(key).map(DayWindow::day)
}

/// Window covering the contiguous days `from_key..=to_key_inclusive`.
pub fn span_range(from_key: &str, to_key_inclusive: &str) -> Result<DayWindow, DateError> {
    DayWindow::span(
        CalendarKey::parse(from_key)?,
        CalendarKey::parse(to_key_inclusive)?,
    )
}
