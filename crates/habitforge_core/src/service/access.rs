//! Principal and ownership checks run before every habit use case.

use crate::model::habit::{Habit, HabitId};
use crate::repo::habit_repo::HabitRepository;
use crate::service::error::ServiceError;

/// Rejects a blank principal id.
pub(crate) fn require_principal(user_id: &str) -> Result<&str, ServiceError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Unauthenticated);
    }
    Ok(trimmed)
}

/// Loads `habit_id` and verifies it belongs to `user_id`.
///
/// Missing habits are `NotFound`; habits of another user are `Forbidden`.
pub(crate) fn load_owned_habit<H: HabitRepository>(
    habits: &H,
    habit_id: HabitId,
    user_id: &str,
) -> Result<Habit, ServiceError> {
    let user_id = require_principal(user_id)?;
    let habit = habits
        .get_habit(habit_id)?
        .ok_or(ServiceError::NotFound(habit_id))?;
    if !habit.is_owned_by(user_id) {
        return Err(ServiceError::Forbidden(habit_id));
    }
    Ok(habit)
}
