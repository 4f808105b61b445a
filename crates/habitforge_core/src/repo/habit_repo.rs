//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide habit records by id or by owner, with filters and pagination.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Habits are never deleted; "delete" is an update of `is_active`.

use crate::calendar::{CalendarKey, DateError};
use crate::db::DbError;
use crate::model::category::{Category, CategoryId};
use crate::model::habit::{Frequency, Habit, HabitId, HabitValidationError};
use crate::repo::schema::ensure_table_ready;
use chrono::DateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    start_date,
    frequency,
    is_active,
    category_id,
    created_at,
    updated_at
FROM habits";

const HABIT_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "title",
    "description",
    "start_date",
    "frequency",
    "is_active",
    "category_id",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by habit and check-in persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(HabitValidationError),
    Db(DbError),
    NotFound(Uuid),
    /// A check-in already exists for this habit and day.
    Conflict { habit_id: HabitId, date: CalendarKey },
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Conflict { habit_id, date } => {
                write!(f, "habit {habit_id} already checked in on {date}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Column used to order habit listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HabitSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    StartDate,
}

impl HabitSortField {
    fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::StartDate => "start_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query options for listing one user's habits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitListQuery {
    pub user_id: String,
    /// Skip habits with `is_active = false`.
    pub active_only: bool,
    /// Case-insensitive substring match on the title.
    pub title_contains: Option<String>,
    pub sort_by: HabitSortField,
    pub sort_order: SortOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Habit provider consumed by services.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists habits matching `query`, honoring sort and pagination.
    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>>;
    /// Counts habits matching `query`, ignoring sort and pagination.
    fn count_habits(&self, query: &HabitListQuery) -> RepoResult<u64>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "habits", HABIT_COLUMNS)?;
        ensure_table_ready(conn, "categories", &["id", "name", "description", "color", "icon"])?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        self.conn.execute(
            "INSERT INTO habits (
                id,
                user_id,
                title,
                description,
                start_date,
                frequency,
                is_active,
                category_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                habit.id.to_string(),
                habit.user_id.as_str(),
                habit.title.as_str(),
                habit.description.as_deref(),
                habit.start_date.midnight().timestamp_millis(),
                habit.frequency.as_str(),
                bool_to_int(habit.is_active),
                habit.category_id.map(|id| id.to_string()),
                habit.created_at,
                habit.updated_at,
            ],
        )?;

        Ok(habit.id)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                title = ?1,
                description = ?2,
                start_date = ?3,
                frequency = ?4,
                is_active = ?5,
                category_id = ?6,
                updated_at = ?7
             WHERE id = ?8;",
            params![
                habit.title.as_str(),
                habit.description.as_deref(),
                habit.start_date.midnight().timestamp_millis(),
                habit.frequency.as_str(),
                bool_to_int(habit.is_active),
                habit.category_id.map(|id| id.to_string()),
                habit.updated_at,
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.id));
        }
        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }
        Ok(None)
    }

    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>> {
        let (mut sql, mut bind_values) = filtered_sql(HABIT_SELECT_SQL, query);

        let direction = match query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(
            " ORDER BY {} {direction}, id ASC",
            query.sort_by.column()
        ));

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }
        Ok(habits)
    }

    fn count_habits(&self, query: &HabitListQuery) -> RepoResult<u64> {
        let (sql, bind_values) = filtered_sql("SELECT COUNT(*) FROM habits", query);
        let count: i64 =
            self.conn
                .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT name, description, color, icon
                 FROM categories
                 WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok(Category {
                        id,
                        name: row.get("name")?,
                        description: row.get("description")?,
                        color: row.get("color")?,
                        icon: row.get("icon")?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }
}

fn filtered_sql(select: &str, query: &HabitListQuery) -> (String, Vec<Value>) {
    let mut sql = format!("{select} WHERE user_id = ?");
    let mut bind_values = vec![Value::Text(query.user_id.clone())];

    if query.active_only {
        sql.push_str(" AND is_active = 1");
    }
    if let Some(needle) = query
        .title_contains
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        sql.push_str(" AND title LIKE ? ESCAPE '\\'");
        bind_values.push(Value::Text(format!("%{}%", escape_like(needle))));
    }

    (sql, bind_values)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let id = parse_uuid(row.get("id")?, "habits.id")?;

    let frequency_text: String = row.get("frequency")?;
    let frequency = Frequency::parse(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in habits.frequency"
        ))
    })?;

    let category_id = match row.get::<_, Option<String>>("category_id")? {
        Some(value) => Some(parse_uuid(value, "habits.category_id")?),
        None => None,
    };

    let habit = Habit {
        id,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start_date: day_from_millis(row.get("start_date")?, "habits.start_date")?,
        frequency,
        is_active: int_to_bool(row.get("is_active")?, "habits.is_active")?,
        category_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    habit.validate()?;
    Ok(habit)
}

pub(crate) fn parse_uuid(value: String, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Decodes a stored UTC-midnight epoch-ms value into its calendar day.
pub(crate) fn day_from_millis(millis: i64, column: &str) -> RepoResult<CalendarKey> {
    let instant = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp {millis} out of range in {column}"))
    })?;
    let key = CalendarKey::from_instant(instant);
    if key.midnight() != instant {
        return Err(RepoError::InvalidData(format!(
            "timestamp {millis} in {column} is not a UTC midnight"
        )));
    }
    Ok(key)
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

impl From<DateError> for RepoError {
    fn from(value: DateError) -> Self {
        Self::InvalidData(value.to_string())
    }
}
