//! Booking module
//!
//! Reservations against a listing and the availability rules that
//! decide whether a date range is still free.

pub mod availability;
pub mod day;
mod model;

pub use availability::{Availability, DateRange};
pub use model::*;
