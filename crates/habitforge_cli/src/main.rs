//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `habitforge_core` linkage with a deterministic ping/version line.
//! - With a user id argument, print that user's habits for today from the
//!   database named by `HABITFORGE_DB_PATH`.

use habitforge_core::{
    open_db, CoreConfig, HabitService, SqliteCheckInRepository, SqliteHabitRepository,
    SystemClock,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("habitforge_core ping={}", habitforge_core::ping());
    println!("habitforge_core version={}", habitforge_core::core_version());

    let Some(user_id) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match print_today(&user_id) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_today(user_id: &str) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    let conn = open_db(&config.db_path)?;
    let service = HabitService::new(
        SqliteHabitRepository::try_new(&conn)?,
        SqliteCheckInRepository::try_new(&conn)?,
        SystemClock,
        config,
    );

    for status in service.today_statuses(user_id)? {
        let mark = if status.is_checked_today { "x" } else { " " };
        println!(
            "[{mark}] {} since {} ({})",
            status.title,
            status.start_date_display,
            status.frequency.as_str()
        );
    }
    Ok(())
}
