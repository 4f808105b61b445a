//! Check-in repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `date` is stored as the UTC-midnight epoch millisecond of its day.
//! - `(habit_id, date)` is unique; a duplicate insert surfaces as
//!   `RepoError::Conflict`, never as a raw SQLite error.
//! - Window queries are half-open `[start, end)` and return ascending dates.

use crate::calendar::{CalendarKey, DayWindow};
use crate::model::check_in::{CheckIn, CheckInId};
use crate::model::habit::HabitId;
use crate::repo::habit_repo::{day_from_millis, parse_uuid, RepoError, RepoResult};
use crate::repo::schema::ensure_table_ready;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};

const CHECK_IN_SELECT_SQL: &str = "SELECT
    id,
    habit_id,
    user_id,
    date,
    note,
    created_at
FROM check_ins";

const CHECK_IN_COLUMNS: &[&str] = &["id", "habit_id", "user_id", "date", "note", "created_at"];

/// Check-in provider consumed by services.
pub trait CheckInRepository {
    /// Inserts a new check-in.
    ///
    /// # Errors
    /// - `Conflict` when the habit already has a check-in on that day.
    fn create_check_in(&self, check_in: &CheckIn) -> RepoResult<CheckInId>;
    fn get_check_in(&self, id: CheckInId) -> RepoResult<Option<CheckIn>>;
    fn find_check_in(&self, habit_id: HabitId, date: CalendarKey) -> RepoResult<Option<CheckIn>>;
    /// Check-ins of one habit inside `window`, ascending by date.
    fn list_check_ins(&self, habit_id: HabitId, window: DayWindow) -> RepoResult<Vec<CheckIn>>;
    /// Check-in days of every habit owned by `user_id` inside `window`,
    /// paired with their habit, ascending by date.
    fn list_user_check_in_dates(
        &self,
        user_id: &str,
        window: DayWindow,
    ) -> RepoResult<Vec<(HabitId, DateTime<Utc>)>>;
    /// Counts a user's check-ins, optionally only those dated at or after
    /// `since`.
    fn count_user_check_ins(&self, user_id: &str, since: Option<DateTime<Utc>>)
        -> RepoResult<u64>;
    /// Replaces the note of an existing check-in.
    fn update_note(&self, id: CheckInId, note: Option<&str>) -> RepoResult<()>;

    /// Check-in instants of one habit inside `window`, ascending.
    fn list_check_in_dates(
        &self,
        habit_id: HabitId,
        window: DayWindow,
    ) -> RepoResult<Vec<DateTime<Utc>>> {
        Ok(self
            .list_check_ins(habit_id, window)?
            .into_iter()
            .map(|check_in| check_in.date.midnight())
            .collect())
    }
}

/// SQLite-backed check-in repository.
pub struct SqliteCheckInRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCheckInRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "check_ins", CHECK_IN_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl CheckInRepository for SqliteCheckInRepository<'_> {
    fn create_check_in(&self, check_in: &CheckIn) -> RepoResult<CheckInId> {
        let inserted = self.conn.execute(
            "INSERT INTO check_ins (
                id,
                habit_id,
                user_id,
                date,
                note,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                check_in.id.to_string(),
                check_in.habit_id.to_string(),
                check_in.user_id.as_str(),
                check_in.date.midnight().timestamp_millis(),
                check_in.note.as_deref(),
                check_in.created_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(check_in.id),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict {
                habit_id: check_in.habit_id,
                date: check_in.date,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn get_check_in(&self, id: CheckInId) -> RepoResult<Option<CheckIn>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHECK_IN_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_check_in_row(row)?));
        }
        Ok(None)
    }

    fn find_check_in(&self, habit_id: HabitId, date: CalendarKey) -> RepoResult<Option<CheckIn>> {
        let window = DayWindow::day(date);
        let mut stmt = self.conn.prepare(&format!(
            "{CHECK_IN_SELECT_SQL} WHERE habit_id = ?1 AND date >= ?2 AND date < ?3 LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![
            habit_id.to_string(),
            window.start.timestamp_millis(),
            window.end.timestamp_millis(),
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_check_in_row(row)?));
        }
        Ok(None)
    }

    fn list_check_ins(&self, habit_id: HabitId, window: DayWindow) -> RepoResult<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHECK_IN_SELECT_SQL}
             WHERE habit_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date ASC;"
        ))?;
        let mut rows = stmt.query(params![
            habit_id.to_string(),
            window.start.timestamp_millis(),
            window.end.timestamp_millis(),
        ])?;

        let mut check_ins = Vec::new();
        while let Some(row) = rows.next()? {
            check_ins.push(parse_check_in_row(row)?);
        }
        Ok(check_ins)
    }

    fn list_user_check_in_dates(
        &self,
        user_id: &str,
        window: DayWindow,
    ) -> RepoResult<Vec<(HabitId, DateTime<Utc>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, date
             FROM check_ins
             WHERE user_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date ASC, habit_id ASC;",
        )?;
        let mut rows = stmt.query(params![
            user_id,
            window.start.timestamp_millis(),
            window.end.timestamp_millis(),
        ])?;

        let mut dates = Vec::new();
        while let Some(row) = rows.next()? {
            let habit_id = parse_uuid(row.get("habit_id")?, "check_ins.habit_id")?;
            let day = day_from_millis(row.get("date")?, "check_ins.date")?;
            dates.push((habit_id, day.midnight()));
        }
        Ok(dates)
    }

    fn count_user_check_ins(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> RepoResult<u64> {
        let count: i64 = match since {
            Some(since) => self.conn.query_row(
                "SELECT COUNT(*) FROM check_ins WHERE user_id = ?1 AND date >= ?2;",
                params![user_id, since.timestamp_millis()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM check_ins WHERE user_id = ?1;",
                [user_id],
                |row| row.get(0),
            )?,
        };
        Ok(count.max(0) as u64)
    }

    fn update_note(&self, id: CheckInId, note: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE check_ins SET note = ?1 WHERE id = ?2;",
            params![note, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

fn parse_check_in_row(row: &Row<'_>) -> RepoResult<CheckIn> {
    Ok(CheckIn {
        id: parse_uuid(row.get("id")?, "check_ins.id")?,
        habit_id: parse_uuid(row.get("habit_id")?, "check_ins.habit_id")?,
        user_id: row.get("user_id")?,
        date: day_from_millis(row.get("date")?, "check_ins.date")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}
