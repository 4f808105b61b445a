//! Habit store bootstrap.
//!
//! Connections handed out here are migrated and have foreign keys enabled,
//! so repositories can assume the `habits`, `categories` and `check_ins`
//! tables exist with their constraints. The schema version lives in
//! `PRAGMA user_version`; a file written by a newer build is refused rather
//! than downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened or created.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Pragma, migration or statement failure on an open connection.
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer HabitForge build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Sqlite(_) => "db_sqlite",
            Self::SchemaTooNew { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "cannot open habit store {target}: {source}"),
            Self::Sqlite(err) => write!(f, "habit store query failed: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "habit store schema v{found} was written by a newer build (this build knows up to v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
