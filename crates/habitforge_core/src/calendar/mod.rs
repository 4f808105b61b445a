//! Calendar-day normalization.
//!
//! # Responsibility
//! - Map instants to canonical UTC `YYYY-MM-DD` keys and back.
//! - Resolve half-open query windows over those days.
//! - Render keys for people in a fixed display timezone.
//!
//! # Invariants
//! - Computation uses UTC days only; the display timezone is applied at the
//!   final rendering step and nowhere else.

pub mod date_key;
pub mod display;
pub mod window;

pub use date_key::{
    add_days, from_calendar_key, to_calendar_key, to_display, today, CalendarKey, DateError,
};
pub use display::{DisplayFormat, DisplayLocale, DisplayStyle};
pub use window::{day_range, span_range, DayWindow};
