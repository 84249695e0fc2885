//! Availability checker
//!
//! A stored booking occupies every day in `[start_date, end_date]`.
//! A candidate range is unavailable when any of its days is occupied by a
//! booking whose status still blocks dates.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::day;
use super::model::Booking;
use crate::{Error, Result};

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(with = "day")]
    pub start: NaiveDate,
    #[serde(with = "day")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidInput(
                "End date cannot be before start date".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Nights billed for the stay; the end day counts
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Outcome of checking a candidate range against a listing's bookings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub requested: DateRange,
    /// Occupied ranges that intersect the request
    pub conflicts: Vec<DateRange>,
}

/// Bookings that still hold their dates
pub fn blocking(bookings: &[Booking]) -> impl Iterator<Item = &Booking> {
    bookings.iter().filter(|booking| booking.status.blocks_dates())
}

/// Ranges a booking calendar should render as taken
pub fn booked_ranges(bookings: &[Booking]) -> Vec<DateRange> {
    let mut ranges: Vec<DateRange> = blocking(bookings).map(Booking::range).collect();
    ranges.sort_by_key(|range| range.start);
    ranges
}

pub fn is_day_booked(bookings: &[Booking], day: NaiveDate) -> bool {
    blocking(bookings).any(|booking| booking.range().contains(day))
}

/// Blocking bookings that intersect `candidate`, skipping `exclude`
pub fn conflicts<'a>(
    bookings: &'a [Booking],
    candidate: &DateRange,
    exclude: Option<Uuid>,
) -> Vec<&'a Booking> {
    blocking(bookings)
        .filter(|booking| Some(booking.id) != exclude)
        .filter(|booking| booking.range().overlaps(candidate))
        .collect()
}

pub fn check(bookings: &[Booking], candidate: DateRange) -> Availability {
    let conflicts: Vec<DateRange> = conflicts(bookings, &candidate, None)
        .into_iter()
        .map(Booking::range)
        .collect();
    Availability {
        available: conflicts.is_empty(),
        requested: candidate,
        conflicts,
    }
}
