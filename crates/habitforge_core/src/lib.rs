//! Core domain logic for HabitForge.
//! Habit check-ins, calendar-day normalization, streaks and completion stats.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod stats;

pub use calendar::{CalendarKey, DateError, DayWindow, DisplayFormat, DisplayLocale, DisplayStyle};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::check_in::{CheckIn, CheckInId};
pub use model::habit::{
    Frequency, Habit, HabitChanges, HabitId, HabitValidationError, NewHabit, UserId,
};
pub use projection::{HabitTodayStatus, HabitView, StreakSummary};
pub use repo::check_in_repo::{CheckInRepository, SqliteCheckInRepository};
pub use repo::habit_repo::{
    HabitListQuery, HabitRepository, HabitSortField, RepoError, RepoResult, SortOrder,
    SqliteHabitRepository,
};
pub use service::check_in_service::CheckInService;
pub use service::error::{CheckInRejection, ServiceError};
pub use service::habit_service::{HabitListParams, HabitPage, HabitService};
pub use service::stats_service::{
    DashboardStats, DashboardSummary, HabitStreakReport, HabitWeeklyReport, MonthlyStats,
    StatsService, TopHabit,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
