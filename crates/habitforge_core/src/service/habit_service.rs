//! Habit use-case service.
//!
//! # Responsibility
//! - Create, read, update, soft-delete and toggle habits for one principal.
//! - List habits with search, sort, pagination and optional same-day
//!   check-ins.
//! - Project today's check-in status for active habits.
//!
//! # Invariants
//! - Ownership is verified before any read of habit details or any write.
//! - Habits are never removed; delete clears `is_active`.

use crate::calendar::{CalendarKey, DayWindow};
use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::model::category::{Category, CategoryId};
use crate::model::habit::{HabitChanges, HabitId, NewHabit};
use crate::projection::{habit_view, today_status, HabitTodayStatus, HabitView};
use crate::repo::check_in_repo::CheckInRepository;
use crate::repo::habit_repo::{HabitListQuery, HabitRepository, HabitSortField, SortOrder};
use crate::service::access::{load_owned_habit, require_principal};
use crate::service::error::ServiceError;
use crate::service::stats_service::streak_summary;
use log::info;
use serde::Serialize;
use std::collections::HashMap;

/// Default page size for habit listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Listing options for `HabitService::list_habits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitListParams {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    /// Case-insensitive title substring.
    pub title: Option<String>,
    pub sort_by: HabitSortField,
    pub sort_order: SortOrder,
    /// Attach check-ins of this `YYYY-MM-DD` day to each habit.
    pub include_check_ins_for: Option<String>,
    /// Include deactivated habits.
    pub show_inactive: bool,
}

impl Default for HabitListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            title: None,
            sort_by: HabitSortField::CreatedAt,
            sort_order: SortOrder::Desc,
            include_check_ins_for: None,
            show_inactive: false,
        }
    }
}

/// One page of habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPage {
    pub habits: Vec<HabitView>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

pub struct HabitService<H: HabitRepository, C: CheckInRepository, K: Clock> {
    habits: H,
    check_ins: C,
    clock: K,
    config: CoreConfig,
}

impl<H: HabitRepository, C: CheckInRepository, K: Clock> HabitService<H, C, K> {
    pub fn new(habits: H, check_ins: C, clock: K, config: CoreConfig) -> Self {
        Self {
            habits,
            check_ins,
            clock,
            config,
        }
    }

    /// Creates a habit owned by `user_id`.
    ///
    /// # Errors
    /// - `Validation` for a short title.
    /// - `NotFound` when `category_id` names an unknown category.
    pub fn create_habit(&self, user_id: &str, input: NewHabit) -> Result<HabitView, ServiceError> {
        let user_id = require_principal(user_id)?;
        input.validate()?;
        let category = self.lookup_category(input.category_id)?;

        let habit = input.into_habit(user_id, self.clock.now());
        self.habits.create_habit(&habit)?;
        info!(
            "event=habit_create module=service status=ok habit_id={} active={}",
            habit.id, habit.is_active
        );

        Ok(habit_view(habit, category, Vec::new(), None, &self.config.display))
    }

    /// Returns one owned habit with its category.
    pub fn get_habit(&self, user_id: &str, habit_id: HabitId) -> Result<HabitView, ServiceError> {
        let habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        let category = self.lookup_category(habit.category_id)?;
        Ok(habit_view(habit, category, Vec::new(), None, &self.config.display))
    }

    /// Returns one owned habit with its streak and, when `date` is given,
    /// the check-ins of that day.
    ///
    /// # Errors
    /// - `InvalidDateFormat` when `date` is not a real `YYYY-MM-DD` day.
    pub fn get_habit_with_check_ins(
        &self,
        user_id: &str,
        habit_id: HabitId,
        date: Option<&str>,
    ) -> Result<HabitView, ServiceError> {
        require_principal(user_id)?;
        let day = date.map(CalendarKey::parse).transpose()?;
        let habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        let category = self.lookup_category(habit.category_id)?;

        let check_ins = match day {
            Some(day) => self.check_ins.list_check_ins(habit.id, DayWindow::day(day))?,
            None => Vec::new(),
        };

        let streak = streak_summary(
            &self.check_ins,
            &habit,
            CalendarKey::today(&self.clock),
            self.config.streak_horizon_days,
        )?;

        Ok(habit_view(
            habit,
            category,
            check_ins,
            Some(streak),
            &self.config.display,
        ))
    }

    /// Applies `changes` to an owned habit.
    pub fn update_habit(
        &self,
        user_id: &str,
        habit_id: HabitId,
        changes: HabitChanges,
    ) -> Result<HabitView, ServiceError> {
        let mut habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        if let Some(Some(category_id)) = changes.category_id {
            self.lookup_category(Some(category_id))?;
        }
        changes.apply(&mut habit)?;
        habit.touch(self.clock.now());

        self.habits.update_habit(&habit)?;
        info!("event=habit_update module=service status=ok habit_id={}", habit.id);

        let category = self.lookup_category(habit.category_id)?;
        Ok(habit_view(habit, category, Vec::new(), None, &self.config.display))
    }

    /// Soft-deletes an owned habit.
    pub fn delete_habit(&self, user_id: &str, habit_id: HabitId) -> Result<HabitView, ServiceError> {
        let mut habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        habit.deactivate();
        habit.touch(self.clock.now());

        self.habits.update_habit(&habit)?;
        info!("event=habit_delete module=service status=ok habit_id={}", habit.id);

        let category = self.lookup_category(habit.category_id)?;
        Ok(habit_view(habit, category, Vec::new(), None, &self.config.display))
    }

    /// Flips `is_active` on an owned habit.
    pub fn toggle_habit(&self, user_id: &str, habit_id: HabitId) -> Result<HabitView, ServiceError> {
        let mut habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        habit.toggle_active();
        habit.touch(self.clock.now());

        self.habits.update_habit(&habit)?;
        info!(
            "event=habit_toggle module=service status=ok habit_id={} active={}",
            habit.id, habit.is_active
        );

        let category = self.lookup_category(habit.category_id)?;
        Ok(habit_view(habit, category, Vec::new(), None, &self.config.display))
    }

    /// Lists the principal's habits page by page.
    ///
    /// `page` and `limit` below 1 are treated as 1.
    pub fn list_habits(
        &self,
        user_id: &str,
        params: &HabitListParams,
    ) -> Result<HabitPage, ServiceError> {
        let user_id = require_principal(user_id)?;
        let day = params
            .include_check_ins_for
            .as_deref()
            .map(CalendarKey::parse)
            .transpose()?;

        let page = params.page.max(1);
        let limit = params.limit.max(1);
        let query = HabitListQuery {
            user_id: user_id.to_string(),
            active_only: !params.show_inactive,
            title_contains: params.title.clone(),
            sort_by: params.sort_by,
            sort_order: params.sort_order,
            limit: Some(limit),
            offset: (page - 1).saturating_mul(limit),
        };

        let total = self.habits.count_habits(&query)?;
        let mut categories = CategoryCache::default();
        let mut habits = Vec::new();
        for habit in self.habits.list_habits(&query)? {
            let category = categories.get(&self.habits, habit.category_id)?;
            let check_ins = match day {
                Some(day) => self.check_ins.list_check_ins(habit.id, DayWindow::day(day))?,
                None => Vec::new(),
            };
            habits.push(habit_view(
                habit,
                category,
                check_ins,
                None,
                &self.config.display,
            ));
        }

        Ok(HabitPage {
            habits,
            total,
            total_pages: total.div_ceil(u64::from(limit)),
            current_page: page,
        })
    }

    /// Active habits with today's check-in state, newest first.
    pub fn today_statuses(&self, user_id: &str) -> Result<Vec<HabitTodayStatus>, ServiceError> {
        let user_id = require_principal(user_id)?;
        let today = DayWindow::day(CalendarKey::today(&self.clock));
        let query = HabitListQuery {
            user_id: user_id.to_string(),
            active_only: true,
            ..HabitListQuery::default()
        };

        let mut categories = CategoryCache::default();
        let mut statuses = Vec::new();
        for habit in self.habits.list_habits(&query)? {
            let category = categories.get(&self.habits, habit.category_id)?;
            let today_check_ins = self.check_ins.list_check_ins(habit.id, today)?;
            statuses.push(today_status(
                habit,
                category,
                today_check_ins,
                &self.config.display,
            ));
        }
        Ok(statuses)
    }

    fn lookup_category(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Option<Category>, ServiceError> {
        match category_id {
            Some(id) => self
                .habits
                .get_category(id)?
                .map(Some)
                .ok_or(ServiceError::NotFound(id)),
            None => Ok(None),
        }
    }
}

/// Per-call category memo so listings look each category up once.
#[derive(Default)]
pub(crate) struct CategoryCache {
    seen: HashMap<CategoryId, Option<Category>>,
}

impl CategoryCache {
    /// Missing categories resolve to `None` rather than failing the listing.
    pub(crate) fn get<H: HabitRepository>(
        &mut self,
        habits: &H,
        category_id: Option<CategoryId>,
    ) -> Result<Option<Category>, ServiceError> {
        let Some(id) = category_id else {
            return Ok(None);
        };
        if let Some(cached) = self.seen.get(&id) {
            return Ok(cached.clone());
        }
        let category = habits.get_category(id)?;
        self.seen.insert(id, category.clone());
        Ok(category)
    }
}
