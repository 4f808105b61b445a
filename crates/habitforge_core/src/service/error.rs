//! Error taxonomy shared by habit, check-in and stats services.

use crate::calendar::{CalendarKey, DateError};
use crate::model::habit::{HabitId, HabitValidationError};
use crate::repo::habit_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Why a check-in was refused for an existing, owned habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInRejection {
    HabitInactive,
    BeforeStartDate { start_date: CalendarKey },
    FutureDate { today: CalendarKey },
}

impl Display for CheckInRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HabitInactive => write!(f, "habit is inactive"),
            Self::BeforeStartDate { start_date } => {
                write!(f, "date is before habit start date {start_date}")
            }
            Self::FutureDate { today } => write!(f, "date is after today {today}"),
        }
    }
}

/// Errors returned by service use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Principal id is blank.
    Unauthenticated,
    /// Habit, check-in or category does not exist.
    NotFound(Uuid),
    /// Habit exists but belongs to another user.
    Forbidden(HabitId),
    InvalidDateFormat(String),
    /// Habit already has a check-in on this day.
    Conflict { habit_id: HabitId, date: CalendarKey },
    Validation(HabitValidationError),
    CheckInRejected {
        habit_id: HabitId,
        reason: CheckInRejection,
    },
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authenticated user id is required"),
            Self::NotFound(id) => write!(f, "not found: {id}"),
            Self::Forbidden(id) => write!(f, "habit {id} belongs to another user"),
            Self::InvalidDateFormat(message) => write!(f, "{message}"),
            Self::Conflict { habit_id, date } => {
                write!(f, "habit {habit_id} is already checked in on {date}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::CheckInRejected { habit_id, reason } => {
                write!(f, "check-in rejected for habit {habit_id}: {reason}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Stable snake_case code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidDateFormat(_) => "invalid_date_format",
            Self::Conflict { .. } => "conflict",
            Self::Validation(_) => "validation",
            Self::CheckInRejected { .. } => "check_in_rejected",
            Self::Repo(_) => "repo_error",
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Conflict { habit_id, date } => Self::Conflict { habit_id, date },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<HabitValidationError> for ServiceError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DateError> for ServiceError {
    fn from(value: DateError) -> Self {
        Self::InvalidDateFormat(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_semantic_errors_keep_their_meaning() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ServiceError::from(RepoError::NotFound(id)),
            ServiceError::NotFound(found) if found == id
        ));

        let date = CalendarKey::parse("2024-01-01").unwrap();
        let err = ServiceError::from(RepoError::Conflict { habit_id: id, date });
        assert_eq!(err.code(), "conflict");

        let err = ServiceError::from(RepoError::InvalidData("bad".to_string()));
        assert_eq!(err.code(), "repo_error");
    }

    #[test]
    fn date_errors_become_invalid_date_format() {
        let err = ServiceError::from(DateError::InvalidDateFormat("2024-13-01".to_string()));
        assert_eq!(err.code(), "invalid_date_format");
        assert!(err.to_string().contains("2024-13-01"));
    }
}
