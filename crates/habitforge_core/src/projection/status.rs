//! Display-ready habit records.
//!
//! Every function here is pure: callers fetch the habit, its category and
//! the relevant check-ins, and the projector only shapes them.

use crate::calendar::{CalendarKey, DisplayFormat, DisplayStyle};
use crate::model::category::{Category, CategoryId};
use crate::model::check_in::CheckIn;
use crate::model::habit::{Frequency, Habit, HabitId, UserId};
use serde::Serialize;

/// Current and historical streak of one habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

/// General habit record as returned by habit use cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitView {
    pub id: HabitId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub frequency: Frequency,
    pub start_date: CalendarKey,
    pub start_date_display: String,
    pub category_id: Option<CategoryId>,
    pub category: Option<Category>,
    /// Check-ins of the requested day only; empty when no day was requested.
    pub check_ins: Vec<CheckIn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakSummary>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Habit record with its check-in state for today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitTodayStatus {
    pub id: HabitId,
    pub title: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub is_active: bool,
    pub category: Option<Category>,
    pub start_date: CalendarKey,
    pub start_date_display: String,
    pub created_at: i64,
    pub is_checked_today: bool,
    pub today_check_in: Option<CheckIn>,
    pub can_check_in_today: bool,
}

/// Shapes `habit` into a `HabitView`.
pub fn habit_view(
    habit: Habit,
    category: Option<Category>,
    check_ins: Vec<CheckIn>,
    streak: Option<StreakSummary>,
    format: &DisplayFormat,
) -> HabitView {
    HabitView {
        start_date_display: format.render(habit.start_date, DisplayStyle::Long),
        id: habit.id,
        user_id: habit.user_id,
        title: habit.title,
        description: habit.description,
        is_active: habit.is_active,
        frequency: habit.frequency,
        start_date: habit.start_date,
        category_id: habit.category_id,
        category,
        check_ins,
        streak,
        created_at: habit.created_at,
        updated_at: habit.updated_at,
    }
}

/// Builds today's status from the check-ins that fall inside today's window.
///
/// `can_check_in_today` is true only for an active habit with no check-in
/// today.
pub fn today_status(
    habit: Habit,
    category: Option<Category>,
    today_check_ins: Vec<CheckIn>,
    format: &DisplayFormat,
) -> HabitTodayStatus {
    let is_checked_today = !today_check_ins.is_empty();
    HabitTodayStatus {
        start_date_display: format.render(habit.start_date, DisplayStyle::Long),
        can_check_in_today: habit.is_active && !is_checked_today,
        id: habit.id,
        title: habit.title,
        description: habit.description,
        frequency: habit.frequency,
        is_active: habit.is_active,
        category,
        start_date: habit.start_date,
        created_at: habit.created_at,
        is_checked_today,
        today_check_in: today_check_ins.into_iter().next(),
    }
}
