//! Service layer for habit use cases.
//!
//! # Responsibility
//! - Verify the principal and habit ownership before touching data.
//! - Compose repositories, the clock and the pure `stats` functions.
//!
//! # Invariants
//! - Services depend on repository traits, never on SQLite directly.

mod access;
pub mod check_in_service;
pub mod error;
pub mod habit_service;
pub mod stats_service;
