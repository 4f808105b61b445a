//! Check-in domain model.
//!
//! # Invariants
//! - At most one check-in exists per `(habit_id, date)`.
//! - Only `note` may change after creation.

use crate::calendar::CalendarKey;
use crate::model::habit::{normalize_text, HabitId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable check-in identifier.
pub type CheckInId = Uuid;

/// One day marked complete for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: CheckInId,
    pub habit_id: HabitId,
    pub user_id: UserId,
    pub date: CalendarKey,
    pub note: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl CheckIn {
    /// Creates a check-in with a generated id; blank notes become `None`.
    pub fn new(
        habit_id: HabitId,
        user_id: impl Into<UserId>,
        date: CalendarKey,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id,
            user_id: user_id.into(),
            date,
            note: normalize_text(note),
            created_at: now.timestamp_millis(),
        }
    }
}
