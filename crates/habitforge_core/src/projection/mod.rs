//! Habit projections for callers.

pub mod status;

pub use status::{habit_view, today_status, HabitTodayStatus, HabitView, StreakSummary};
