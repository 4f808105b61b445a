//! Pure statistics over already-fetched check-in histories.
//!
//! # Responsibility
//! - Compute streaks and completion percentages from calendar keys.
//!
//! # Invariants
//! - No I/O and no clock reads; "today" is always an explicit input.

pub mod period;
pub mod streak;

pub use period::{
    completion_percent, count_by_category, daily_counts, monthly_completion, top_habits,
    weekly_progress, DailyCount, DayProgress, WeeklyProgress, DEFAULT_TOP_HABITS, UNCATEGORIZED,
    WEEK_DAYS,
};
pub use streak::{current_streak, key_set, longest_streak, DEFAULT_STREAK_HORIZON_DAYS};
