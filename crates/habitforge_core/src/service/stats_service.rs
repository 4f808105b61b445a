//! Streak, weekly, monthly and dashboard statistics.
//!
//! # Responsibility
//! - Fetch check-in histories through the providers and feed them to the
//!   pure `stats` functions.
//!
//! # Invariants
//! - "Today" comes from the injected clock, read once per call.
//! - Per-habit reports verify ownership first.

use crate::calendar::{CalendarKey, DayWindow, DisplayStyle};
use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::model::category::Category;
use crate::model::habit::{Habit, HabitId};
use crate::projection::StreakSummary;
use crate::repo::check_in_repo::CheckInRepository;
use crate::repo::habit_repo::{HabitListQuery, HabitRepository};
use crate::service::access::{load_owned_habit, require_principal};
use crate::service::error::ServiceError;
use crate::service::habit_service::CategoryCache;
use crate::stats::{
    count_by_category, current_streak, daily_counts, key_set, longest_streak, monthly_completion,
    top_habits, weekly_progress, DailyCount, WeeklyProgress, WEEK_DAYS,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Current and longest streak of one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStreakReport {
    pub habit_id: HabitId,
    pub habit_title: String,
    pub start_date: CalendarKey,
    pub start_date_display: String,
    pub streak: u32,
    pub longest_streak: u32,
}

/// Last-7-days progress of one habit with its current streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitWeeklyReport {
    pub habit_id: HabitId,
    pub habit_title: String,
    pub start_date: CalendarKey,
    pub start_date_display: String,
    #[serde(flatten)]
    pub progress: WeeklyProgress,
    pub streak: u32,
}

/// Ranked entry of `MonthlyStats::top_habits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHabit {
    pub id: HabitId,
    pub title: String,
    pub streak: u32,
    pub start_date: CalendarKey,
    pub start_date_display: String,
    pub category: Option<Category>,
}

/// Month-to-date completion for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Active habit count.
    pub habits: u64,
    /// Check-ins dated in the current UTC month.
    pub check_ins: u64,
    pub completion: u32,
    /// Month label in the display timezone, e.g. `Januari 2024`.
    pub month: String,
    pub top_habits: Vec<TopHabit>,
}

/// Headline counters for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_habits: u64,
    pub active_habits: u64,
    pub total_check_ins: u64,
    pub today_check_ins: u64,
    /// Highest current streak among active habits.
    pub best_current_streak: u32,
}

/// Breakdown charts for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Active habits per category name.
    pub habits_by_category: BTreeMap<String, u32>,
    /// Check-ins per day over the dashboard lookback, ascending.
    pub daily_check_ins: Vec<DailyCount>,
    pub monthly_completion: u32,
}

pub struct StatsService<H: HabitRepository, C: CheckInRepository, K: Clock> {
    habits: H,
    check_ins: C,
    clock: K,
    config: CoreConfig,
}

impl<H: HabitRepository, C: CheckInRepository, K: Clock> StatsService<H, C, K> {
    pub fn new(habits: H, check_ins: C, clock: K, config: CoreConfig) -> Self {
        Self {
            habits,
            check_ins,
            clock,
            config,
        }
    }

    /// Current streak (bounded by the horizon) and longest streak since the
    /// habit's start date.
    pub fn habit_streak(
        &self,
        user_id: &str,
        habit_id: HabitId,
    ) -> Result<HabitStreakReport, ServiceError> {
        let habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        let today = CalendarKey::today(&self.clock);
        let summary = streak_summary(
            &self.check_ins,
            &habit,
            today,
            self.config.streak_horizon_days,
        )?;

        Ok(HabitStreakReport {
            start_date_display: self.config.display.render(habit.start_date, DisplayStyle::Long),
            habit_id: habit.id,
            habit_title: habit.title,
            start_date: habit.start_date,
            streak: summary.current,
            longest_streak: summary.longest,
        })
    }

    /// Seven-day progress strip ending today.
    pub fn weekly_progress(
        &self,
        user_id: &str,
        habit_id: HabitId,
    ) -> Result<HabitWeeklyReport, ServiceError> {
        let habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        let today = CalendarKey::today(&self.clock);

        let week = self
            .check_ins
            .list_check_in_dates(habit.id, DayWindow::lookback(today, WEEK_DAYS)?)?;
        let progress = weekly_progress(&key_set(week), today, &self.config.display)?;
        let streak = self.current_streak_of(&habit, today)?;

        Ok(HabitWeeklyReport {
            start_date_display: self.config.display.render(habit.start_date, DisplayStyle::Long),
            habit_id: habit.id,
            habit_title: habit.title,
            start_date: habit.start_date,
            progress,
            streak,
        })
    }

    /// Month-to-date completion and the top habits by current streak.
    pub fn monthly_stats(&self, user_id: &str) -> Result<MonthlyStats, ServiceError> {
        let user_id = require_principal(user_id)?;
        let today = CalendarKey::today(&self.clock);
        let month = DayWindow::month_to_date(today);

        let active = self.active_habits(user_id)?;
        let habits = active.len() as u64;
        let check_ins = self
            .check_ins
            .count_user_check_ins(user_id, Some(month.start))?;
        let completion = monthly_completion(habits, check_ins, today.day_of_month());

        let mut ranked = Vec::with_capacity(active.len());
        for habit in active {
            let streak = self.current_streak_of(&habit, today)?;
            ranked.push((habit, streak));
        }

        let mut categories = CategoryCache::default();
        let mut top = Vec::new();
        for (habit, streak) in top_habits(ranked, self.config.top_habits) {
            top.push(TopHabit {
                start_date_display: self.config.display.render(habit.start_date, DisplayStyle::Long),
                category: categories.get(&self.habits, habit.category_id)?,
                id: habit.id,
                title: habit.title,
                streak,
                start_date: habit.start_date,
            });
        }

        Ok(MonthlyStats {
            habits,
            check_ins,
            completion,
            month: self.config.display.render(today, DisplayStyle::MonthYear),
            top_habits: top,
        })
    }

    /// Habit and check-in totals plus the best running streak.
    pub fn dashboard_summary(&self, user_id: &str) -> Result<DashboardSummary, ServiceError> {
        let user_id = require_principal(user_id)?;
        let today = CalendarKey::today(&self.clock);

        let total_habits = self.habits.count_habits(&HabitListQuery {
            user_id: user_id.to_string(),
            ..HabitListQuery::default()
        })?;
        let active = self.active_habits(user_id)?;
        let total_check_ins = self.check_ins.count_user_check_ins(user_id, None)?;
        let today_check_ins = self
            .check_ins
            .list_user_check_in_dates(user_id, DayWindow::day(today))?
            .len() as u64;

        let mut best_current_streak = 0;
        for habit in &active {
            best_current_streak = best_current_streak.max(self.current_streak_of(habit, today)?);
        }

        Ok(DashboardSummary {
            total_habits,
            active_habits: active.len() as u64,
            total_check_ins,
            today_check_ins,
            best_current_streak,
        })
    }

    /// Active habits per category, daily check-in counts over the lookback,
    /// and month-to-date completion.
    pub fn dashboard_stats(&self, user_id: &str) -> Result<DashboardStats, ServiceError> {
        let user_id = require_principal(user_id)?;
        let today = CalendarKey::today(&self.clock);
        let active = self.active_habits(user_id)?;

        let mut categories = CategoryCache::default();
        let mut names = Vec::with_capacity(active.len());
        for habit in &active {
            names.push(
                categories
                    .get(&self.habits, habit.category_id)?
                    .map(|category| category.name),
            );
        }
        let habits_by_category =
            count_by_category(names.iter().map(|name| name.as_deref()));

        let lookback = self.config.dashboard_lookback_days;
        let dated = self
            .check_ins
            .list_user_check_in_dates(user_id, DayWindow::lookback(today, lookback)?)?;
        let daily_check_ins =
            daily_counts(dated.into_iter().map(|(_, instant)| instant), today, lookback)?;

        let month_check_ins = self.check_ins.count_user_check_ins(
            user_id,
            Some(DayWindow::month_to_date(today).start),
        )?;

        Ok(DashboardStats {
            habits_by_category,
            daily_check_ins,
            monthly_completion: monthly_completion(
                active.len() as u64,
                month_check_ins,
                today.day_of_month(),
            ),
        })
    }

    fn active_habits(&self, user_id: &str) -> Result<Vec<Habit>, ServiceError> {
        Ok(self.habits.list_habits(&HabitListQuery {
            user_id: user_id.to_string(),
            active_only: true,
            ..HabitListQuery::default()
        })?)
    }

    fn current_streak_of(&self, habit: &Habit, today: CalendarKey) -> Result<u32, ServiceError> {
        let horizon = self.config.streak_horizon_days;
        let Some(window) = streak_window(habit, today, horizon)? else {
            return Ok(0);
        };
        let recent = self.check_ins.list_check_in_dates(habit.id, window)?;
        Ok(current_streak(&key_set(recent), today, horizon))
    }
}

/// Lookback window for the current streak, never reaching before
/// `start_date`. `None` when the habit starts after `today`.
fn streak_window(
    habit: &Habit,
    today: CalendarKey,
    horizon_days: u32,
) -> Result<Option<DayWindow>, ServiceError> {
    if habit.start_date > today {
        return Ok(None);
    }
    let lookback = DayWindow::lookback(today, horizon_days)?;
    if habit.start_date.midnight() > lookback.start {
        return Ok(Some(DayWindow::span(habit.start_date, today)?));
    }
    Ok(Some(lookback))
}

/// Current streak over the horizon and longest streak since `start_date`.
pub(crate) fn streak_summary<C: CheckInRepository>(
    check_ins: &C,
    habit: &Habit,
    today: CalendarKey,
    horizon_days: u32,
) -> Result<StreakSummary, ServiceError> {
    let Some(window) = streak_window(habit, today, horizon_days)? else {
        return Ok(StreakSummary {
            current: 0,
            longest: 0,
        });
    };
    let recent = check_ins.list_check_in_dates(habit.id, window)?;
    let history = check_ins.list_check_in_dates(habit.id, DayWindow::span(habit.start_date, today)?)?;

    Ok(StreakSummary {
        current: current_streak(&key_set(recent), today, horizon_days),
        longest: longest_streak(&key_set(history)),
    })
}
