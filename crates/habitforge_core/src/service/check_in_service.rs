//! Check-in use-case service.
//!
//! # Responsibility
//! - Record one completion per habit per UTC day.
//! - Edit check-in notes and read a habit's history over a span of days.
//!
//! # Invariants
//! - Ownership and date checks run before any write.
//! - A second check-in for the same `(habit, day)` is `Conflict`, whether it
//!   is caught by the pre-check or by the storage UNIQUE index.

use crate::calendar::{CalendarKey, DayWindow};
use crate::clock::Clock;
use crate::model::check_in::{CheckIn, CheckInId};
use crate::model::habit::{normalize_text, HabitId};
use crate::repo::check_in_repo::CheckInRepository;
use crate::repo::habit_repo::HabitRepository;
use crate::service::access::{load_owned_habit, require_principal};
use crate::service::error::{CheckInRejection, ServiceError};
use log::{info, warn};

pub struct CheckInService<H: HabitRepository, C: CheckInRepository, K: Clock> {
    habits: H,
    check_ins: C,
    clock: K,
}

impl<H: HabitRepository, C: CheckInRepository, K: Clock> CheckInService<H, C, K> {
    pub fn new(habits: H, check_ins: C, clock: K) -> Self {
        Self {
            habits,
            check_ins,
            clock,
        }
    }

    /// Marks `habit_id` complete on `date` (today when `None`).
    ///
    /// # Errors
    /// - `Unauthenticated` for a blank principal, checked first.
    /// - `InvalidDateFormat` for a malformed `date`.
    /// - `NotFound` / `Forbidden` for a missing or foreign habit.
    /// - `CheckInRejected` for an inactive habit, a day before the habit's
    ///   start date, or a day after today.
    /// - `Conflict` when the day is already checked in.
    pub fn check_in(
        &self,
        user_id: &str,
        habit_id: HabitId,
        date: Option<&str>,
        note: Option<&str>,
    ) -> Result<CheckIn, ServiceError> {
        require_principal(user_id)?;
        let now = self.clock.now();
        let today = CalendarKey::from_instant(now);
        let day = match date {
            Some(raw) => CalendarKey::parse(raw)?,
            None => today,
        };

        let habit = load_owned_habit(&self.habits, habit_id, user_id)?;
        let rejection = if !habit.is_active {
            Some(CheckInRejection::HabitInactive)
        } else if day < habit.start_date {
            Some(CheckInRejection::BeforeStartDate {
                start_date: habit.start_date,
            })
        } else if day > today {
            Some(CheckInRejection::FutureDate { today })
        } else {
            None
        };
        if let Some(reason) = rejection {
            return Err(ServiceError::CheckInRejected { habit_id, reason });
        }

        if self.check_ins.find_check_in(habit_id, day)?.is_some() {
            return Err(ServiceError::Conflict {
                habit_id,
                date: day,
            });
        }

        let check_in = CheckIn::new(habit_id, habit.user_id, day, note, now);
        self.check_ins
            .create_check_in(&check_in)
            .map_err(ServiceError::from)
            .inspect_err(|err| {
                warn!(
                    "event=check_in_create module=service status=error habit_id={} date={} error_code={}",
                    habit_id,
                    day,
                    err.code()
                );
            })?;
        info!(
            "event=check_in_create module=service status=ok habit_id={} date={}",
            habit_id, day
        );
        Ok(check_in)
    }

    /// Replaces the note of a check-in on an owned habit. Blank clears it.
    pub fn update_note(
        &self,
        user_id: &str,
        check_in_id: CheckInId,
        note: Option<&str>,
    ) -> Result<CheckIn, ServiceError> {
        require_principal(user_id)?;
        let mut check_in = self
            .check_ins
            .get_check_in(check_in_id)?
            .ok_or(ServiceError::NotFound(check_in_id))?;
        load_owned_habit(&self.habits, check_in.habit_id, user_id)?;

        let note = normalize_text(note);
        self.check_ins.update_note(check_in_id, note.as_deref())?;
        info!(
            "event=check_in_note module=service status=ok check_in_id={}",
            check_in_id
        );

        check_in.note = note;
        Ok(check_in)
    }

    /// Check-ins of an owned habit over `from..=to`, ascending.
    pub fn history(
        &self,
        user_id: &str,
        habit_id: HabitId,
        from: &str,
        to: &str,
    ) -> Result<Vec<CheckIn>, ServiceError> {
        require_principal(user_id)?;
        let window = DayWindow::span(CalendarKey::parse(from)?, CalendarKey::parse(to)?)?;
        load_owned_habit(&self.habits, habit_id, user_id)?;
        Ok(self.check_ins.list_check_ins(habit_id, window)?)
    }

    /// Today's check-in of an owned habit, if any.
    pub fn today_check_in(
        &self,
        user_id: &str,
        habit_id: HabitId,
    ) -> Result<Option<CheckIn>, ServiceError> {
        load_owned_habit(&self.habits, habit_id, user_id)?;
        let today = CalendarKey::today(&self.clock);
        Ok(self.check_ins.find_check_in(habit_id, today)?)
    }
}
