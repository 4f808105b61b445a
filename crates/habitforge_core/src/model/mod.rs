//! Domain model for habits, check-ins and categories.
//!
//! # Responsibility
//! - Define canonical records consumed by repositories and services.
//! - Keep field rules (title length, note normalization) next to the data.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Habits are soft-deleted through `is_active`, never removed.

pub mod category;
pub mod check_in;
pub mod habit;
