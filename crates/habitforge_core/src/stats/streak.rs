//! Consecutive-day streaks over a check-in history.
//!
//! # Invariants
//! - The current streak is anchored at today: no check-in today means 0,
//!   even when yesterday and earlier days are all checked in.
//! - The current streak never exceeds the lookback horizon.

use crate::calendar::CalendarKey;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

/// Default number of days walked back when computing a current streak.
pub const DEFAULT_STREAK_HORIZON_DAYS: u32 = 90;

/// Collects the distinct UTC days of `instants`.
pub fn key_set(instants: impl IntoIterator<Item = DateTime<Utc>>) -> HashSet<CalendarKey> {
    instants.into_iter().map(CalendarKey::from_instant).collect()
}

/// Number of consecutive checked-in days ending at `today`, walking back at
/// most `horizon_days` days.
pub fn current_streak(
    check_in_keys: &HashSet<CalendarKey>,
    today: CalendarKey,
    horizon_days: u32,
) -> u32 {
    let mut streak = 0;
    let mut cursor = today;
    for _ in 0..horizon_days {
        if !check_in_keys.contains(&cursor) {
            break;
        }
        streak += 1;
        cursor = match cursor.add_days(-1) {
            Ok(previous) => previous,
            Err(_) => break,
        };
    }
    streak
}

/// Longest run of consecutive days anywhere in `check_in_keys`.
///
/// Only the supplied history is considered; callers decide how far back it
/// reaches.
pub fn longest_streak(check_in_keys: &HashSet<CalendarKey>) -> u32 {
    let ordered: BTreeSet<CalendarKey> = check_in_keys.iter().copied().collect();
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<CalendarKey> = None;

    for key in ordered {
        let continues = previous
            .and_then(|prev| prev.add_days(1).ok())
            .is_some_and(|expected| expected == key);
        run = if continues { run + 1 } else { 1 };
        longest = longest.max(run);
        previous = Some(key);
    }

    longest
}
