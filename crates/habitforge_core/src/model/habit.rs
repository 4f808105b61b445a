//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record and its field rules.
//! - Provide lifecycle helpers for soft-delete and active toggling.
//!
//! # Invariants
//! - `id` is a non-nil UUID and never reused.
//! - `title` is trimmed and at least `MIN_TITLE_CHARS` characters long.
//! - Deletion only clears `is_active`; habits are never removed.

use crate::calendar::CalendarKey;
use crate::model::category::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable habit identifier.
pub type HabitId = Uuid;

/// Opaque authenticated principal id supplied by the caller.
pub type UserId = String;

/// Minimum trimmed title length, counted in characters.
pub const MIN_TITLE_CHARS: usize = 3;

/// Recurrence rule. Stored and echoed; streak logic is daily regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Field-level validation failures for habits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    NilId,
    BlankOwner,
    TitleTooShort { min: usize, actual: usize },
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "habit id must not be nil"),
            Self::BlankOwner => write!(f, "habit owner must not be blank"),
            Self::TitleTooShort { min, actual } => write!(
                f,
                "habit title must have at least {min} characters, got {actual}"
            ),
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    /// First day the habit may be counted.
    pub start_date: CalendarKey,
    pub frequency: Frequency,
    pub is_active: bool,
    pub category_id: Option<CategoryId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Habit {
    /// Creates an active habit with a generated id, stamped at `now`.
    ///
    /// Title and description are normalized but not validated; call
    /// `validate()` before persisting.
    pub fn new(
        user_id: impl Into<UserId>,
        title: &str,
        start_date: CalendarKey,
        frequency: Frequency,
        now: DateTime<Utc>,
    ) -> Self {
        let stamp = now.timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            title: title.trim().to_string(),
            description: None,
            start_date,
            frequency,
            is_active: true,
            category_id: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.id.is_nil() {
            return Err(HabitValidationError::NilId);
        }
        if self.user_id.trim().is_empty() {
            return Err(HabitValidationError::BlankOwner);
        }
        check_title(&self.title)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Soft-deletes by deactivating.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn toggle_active(&mut self) {
        self.is_active = !self.is_active;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.timestamp_millis();
    }
}

/// Caller input for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub start_date: CalendarKey,
    pub frequency: Frequency,
    pub category_id: Option<CategoryId>,
    /// Defaults to active when omitted.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewHabit {
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        check_title(&self.title)
    }

    /// Builds the habit record owned by `user_id`.
    pub fn into_habit(self, user_id: impl Into<UserId>, now: DateTime<Utc>) -> Habit {
        let mut habit = Habit::new(user_id, &self.title, self.start_date, self.frequency, now);
        habit.description = normalize_text(self.description.as_deref());
        habit.category_id = self.category_id;
        habit.is_active = self.is_active.unwrap_or(true);
        habit
    }
}

/// Partial update; `None` fields are left untouched.
///
/// `category_id: Some(None)` clears the category. On the wire an explicit
/// `"categoryId": null` clears it and a missing key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<CalendarKey>,
    pub frequency: Option<Frequency>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub category_id: Option<Option<CategoryId>>,
}

/// Only runs when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl HabitChanges {
    /// Applies the changes to `habit`, validating the new title first.
    pub fn apply(self, habit: &mut Habit) -> Result<(), HabitValidationError> {
        if let Some(title) = self.title.as_deref() {
            habit.title = normalize_title(title)?;
        }
        if let Some(description) = self.description.as_deref() {
            habit.description = normalize_text(Some(description));
        }
        if let Some(start_date) = self.start_date {
            habit.start_date = start_date;
        }
        if let Some(frequency) = self.frequency {
            habit.frequency = frequency;
        }
        if let Some(category_id) = self.category_id {
            habit.category_id = category_id;
        }
        Ok(())
    }
}

/// Trims a title and enforces the minimum length.
pub fn normalize_title(raw: &str) -> Result<String, HabitValidationError> {
    let trimmed = raw.trim();
    check_title(trimmed)?;
    Ok(trimmed.to_string())
}

/// Trims free text; blank becomes `None`.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn check_title(title: &str) -> Result<(), HabitValidationError> {
    let actual = title.trim().chars().count();
    if actual < MIN_TITLE_CHARS {
        return Err(HabitValidationError::TitleTooShort {
            min: MIN_TITLE_CHARS,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Habit {
        Habit::new(
            "user-a",
            "  Read a chapter ",
            CalendarKey::parse("2024-01-01").unwrap(),
            Frequency::Daily,
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn new_habit_is_active_and_trimmed() {
        let habit = sample();
        assert_eq!(habit.title, "Read a chapter");
        assert!(habit.is_active);
        assert_eq!(habit.created_at, habit.updated_at);
        assert!(habit.validate().is_ok());
    }

    #[test]
    fn title_rules_count_characters_after_trim() {
        assert_eq!(
            normalize_title("  ab  "),
            Err(HabitValidationError::TitleTooShort { min: 3, actual: 2 })
        );
        assert_eq!(normalize_title(" yög ").unwrap(), "yög");
    }

    #[test]
    fn validate_rejects_nil_id_and_blank_owner() {
        let mut habit = sample();
        habit.id = Uuid::nil();
        assert_eq!(habit.validate(), Err(HabitValidationError::NilId));

        let mut habit = sample();
        habit.user_id = "  ".to_string();
        assert_eq!(habit.validate(), Err(HabitValidationError::BlankOwner));
    }

    #[test]
    fn toggle_and_deactivate() {
        let mut habit = sample();
        habit.toggle_active();
        assert!(!habit.is_active);
        habit.toggle_active();
        assert!(habit.is_active);
        habit.deactivate();
        assert!(!habit.is_active);
    }

    #[test]
    fn normalize_text_drops_blank() {
        assert_eq!(normalize_text(Some("   ")), None);
        assert_eq!(normalize_text(Some(" walk ")), Some("walk".to_string()));
        assert_eq!(normalize_text(None), None);
    }

    #[test]
    fn new_habit_builds_normalized_record() {
        let input = NewHabit {
            title: " Stretch ".to_string(),
            description: Some("  ".to_string()),
            start_date: CalendarKey::parse("2024-02-01").unwrap(),
            frequency: Frequency::Weekly,
            category_id: None,
            is_active: None,
        };
        assert!(input.validate().is_ok());

        let habit = input.into_habit("user-a", Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(habit.title, "Stretch");
        assert_eq!(habit.description, None);
        assert_eq!(habit.frequency, Frequency::Weekly);
        assert!(habit.is_active);
    }

    #[test]
    fn changes_reject_short_title_without_mutation() {
        let mut habit = sample();
        let changes = HabitChanges {
            title: Some(" x ".to_string()),
            ..HabitChanges::default()
        };
        assert!(changes.apply(&mut habit).is_err());
        assert_eq!(habit.title, "Read a chapter");

        let changes = HabitChanges {
            description: Some("before bed".to_string()),
            category_id: Some(Some(Uuid::new_v4())),
            ..HabitChanges::default()
        };
        changes.apply(&mut habit).unwrap();
        assert_eq!(habit.description.as_deref(), Some("before bed"));
        assert!(habit.category_id.is_some());
    }

    #[test]
    fn changes_distinguish_null_category_from_missing_key() {
        let cleared: HabitChanges = serde_json::from_str(r#"{"categoryId": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let untouched: HabitChanges = serde_json::from_str(r#"{"title": "Walk"}"#).unwrap();
        assert_eq!(untouched.category_id, None);

        let category_id = Uuid::new_v4();
        let set: HabitChanges =
            serde_json::from_str(&format!(r#"{{"categoryId": "{category_id}"}}"#)).unwrap();
        assert_eq!(set.category_id, Some(Some(category_id)));

        let mut habit = sample();
        habit.category_id = Some(category_id);
        untouched.apply(&mut habit).unwrap();
        assert_eq!(habit.category_id, Some(category_id));
        cleared.apply(&mut habit).unwrap();
        assert_eq!(habit.category_id, None);
    }

    #[test]
    fn frequency_round_trips_through_storage_names() {
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            assert_eq!(Frequency::parse(frequency.as_str()), Some(frequency));
        }
        assert_eq!(Frequency::parse("hourly"), None);
    }
}
