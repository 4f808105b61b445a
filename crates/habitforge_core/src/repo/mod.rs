//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the habit and check-in providers consumed by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Habit::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod check_in_repo;
pub mod habit_repo;
mod schema;
