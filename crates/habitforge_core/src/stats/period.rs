//! Weekly and monthly completion aggregates.
//!
//! # Invariants
//! - Weekly progress always covers exactly the 7 days `[today-6 ..= today]`
//!   in ascending order.
//! - Percentages round half away from zero and never divide by zero.
//! - Top-habit ranking is a stable sort: ties keep input order.

use crate::calendar::{CalendarKey, DateError, DisplayFormat, DisplayStyle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Days covered by weekly progress.
pub const WEEK_DAYS: u32 = 7;
/// Default number of entries kept by `top_habits`.
pub const DEFAULT_TOP_HABITS: usize = 3;
/// Bucket name for habits without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One day of weekly progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub date: CalendarKey,
    /// Long display date, e.g. `5 Jan 2024`.
    pub date_display: String,
    /// Short weekday name.
    pub day: String,
    /// Day and short month, e.g. `5 Jan`.
    pub display_date: String,
    pub completed: bool,
}

/// Last-7-days view for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub week_progress: Vec<DayProgress>,
    pub completed_days: u32,
    /// `round(100 * completed_days / 7)`.
    pub weekly_completion: u32,
}

/// Check-in count for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: CalendarKey,
    pub check_ins: u32,
}

/// `round(100 * done / possible)`, or 0 when nothing was possible.
pub fn completion_percent(done: u64, possible: u64) -> u32 {
    if possible == 0 {
        return 0;
    }
    (100.0 * done as f64 / possible as f64).round() as u32
}

/// Builds the 7-day progress strip ending at `today`.
pub fn weekly_progress(
    check_in_keys: &HashSet<CalendarKey>,
    today: CalendarKey,
    format: &DisplayFormat,
) -> Result<WeeklyProgress, DateError> {
    let mut week_progress = Vec::with_capacity(WEEK_DAYS as usize);
    for offset in (0..i64::from(WEEK_DAYS)).rev() {
        let date = today.add_days(-offset)?;
        week_progress.push(DayProgress {
            date,
            date_display: format.render(date, DisplayStyle::Long),
            day: format.render(date, DisplayStyle::WeekdayShort),
            display_date: format.render(date, DisplayStyle::DayMonth),
            completed: check_in_keys.contains(&date),
        });
    }

    let completed_days = week_progress.iter().filter(|day| day.completed).count() as u32;
    Ok(WeeklyProgress {
        week_progress,
        completed_days,
        weekly_completion: completion_percent(u64::from(completed_days), u64::from(WEEK_DAYS)),
    })
}

/// Share of possible check-ins recorded so far this month.
///
/// `active_habits * elapsed_days` check-ins were possible; the result can
/// exceed 100 when check-ins of since-deactivated habits are counted.
pub fn monthly_completion(active_habits: u64, check_ins: u64, elapsed_days: u32) -> u32 {
    if active_habits == 0 {
        return 0;
    }
    completion_percent(check_ins, active_habits * u64::from(elapsed_days))
}

/// Highest streaks first, at most `limit` entries. Equal streaks keep the
/// order they were supplied in.
pub fn top_habits<T>(mut ranked: Vec<(T, u32)>, limit: usize) -> Vec<(T, u32)> {
    ranked.sort_by(|left, right| right.1.cmp(&left.1));
    ranked.truncate(limit);
    ranked
}

/// Per-day check-in counts for the `days` days ending at `today`, ascending.
pub fn daily_counts(
    instants: impl IntoIterator<Item = DateTime<Utc>>,
    today: CalendarKey,
    days: u32,
) -> Result<Vec<DailyCount>, DateError> {
    let mut per_day: HashMap<CalendarKey, u32> = HashMap::new();
    for instant in instants {
        *per_day.entry(CalendarKey::from_instant(instant)).or_default() += 1;
    }

    let mut counts = Vec::with_capacity(days as usize);
    for offset in (0..i64::from(days)).rev() {
        let date = today.add_days(-offset)?;
        counts.push(DailyCount {
            date,
            check_ins: per_day.get(&date).copied().unwrap_or(0),
        });
    }
    Ok(counts)
}

/// Habit count per category name; `None` is bucketed as `Uncategorized`.
pub fn count_by_category<'a>(
    category_names: impl IntoIterator<Item = Option<&'a str>>,
) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for name in category_names {
        *counts
            .entry(name.unwrap_or(UNCATEGORIZED).to_string())
            .or_insert(0) += 1;
    }
    counts
}
