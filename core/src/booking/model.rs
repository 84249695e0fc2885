//! Booking model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::availability::DateRange;
use super::day;
use crate::{Error, Result};

/// Lifecycle of a reservation.
///
/// Hosts and admins may move a booking between any of these states.
/// Cancelling removes the record rather than adding a fourth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Declined,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }

    /// Declined reservations release their dates
    pub fn blocks_dates(self) -> bool {
        !matches!(self, Self::Declined)
    }

    /// Guests may only withdraw a request nobody has acted on yet
    pub fn guest_can_cancel(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            _ => Err(Error::InvalidInput(format!(
                "Unsupported booking status '{}'",
                value
            ))),
        }
    }
}

/// A reservation of a listing by a guest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Id of the booked listing
    pub property: Uuid,
    /// Id of the guest
    pub user: Uuid,
    #[serde(with = "day")]
    pub start_date: NaiveDate,
    /// Last night of the stay, inclusive
    #[serde(with = "day")]
    pub end_date: NaiveDate,
    pub guests: u32,
    pub total_price: f64,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn is_guest(&self, user_id: Uuid) -> bool {
        self.user == user_id
    }
}

/// A guest's booking request
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub property: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
    pub special_requests: Option<String>,
}

impl NewBooking {
    /// Validate against the listing and price the stay
    pub fn into_booking(
        self,
        guest: Uuid,
        price_per_night: f64,
        max_guests: u32,
    ) -> Result<Booking> {
        let range = DateRange::new(self.start_date, self.end_date)?;
        validate_guests(self.guests, max_guests)?;
        Ok(Booking {
            id: Uuid::new_v4(),
            property: self.property,
            user: guest,
            start_date: range.start,
            end_date: range.end,
            guests: self.guests,
            total_price: total_price(range, price_per_night),
            special_requests: self
                .special_requests
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

/// Administrative edit of a booking. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub total_price: Option<f64>,
    pub special_requests: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingUpdate {
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn changes_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Write the changes into `booking`.
    ///
    /// When the dates move and no explicit price is given the stay is
    /// re-priced at `price_per_night`.
    pub fn apply(self, booking: &mut Booking, price_per_night: f64, max_guests: u32) -> Result<()> {
        let dates_changed = self.changes_dates();
        let range = DateRange::new(
            self.start_date.unwrap_or(booking.start_date),
            self.end_date.unwrap_or(booking.end_date),
        )?;
        booking.start_date = range.start;
        booking.end_date = range.end;

        if let Some(guests) = self.guests {
            booking.guests = validate_guests(guests, max_guests)?;
        }
        match self.total_price {
            Some(price) if !price.is_finite() || price < 0.0 => {
                return Err(Error::InvalidInput(
                    "Total price must be a non-negative number".to_string(),
                ));
            }
            Some(price) => booking.total_price = price,
            None if dates_changed => booking.total_price = total_price(range, price_per_night),
            None => {}
        }
        if let Some(text) = self.special_requests {
            booking.special_requests = text.trim().to_string();
        }
        if let Some(status) = self.status {
            booking.status = status;
        }
        Ok(())
    }
}

pub fn total_price(range: DateRange, price_per_night: f64) -> f64 {
    range.nights() as f64 * price_per_night
}

fn validate_guests(guests: u32, max_guests: u32) -> Result<u32> {
    if guests == 0 {
        return Err(Error::InvalidInput(
            "A booking needs at least one guest".to_string(),
        ));
    }
    if guests > max_guests {
        return Err(Error::InvalidInput(format!(
            "The maximum number of guests allowed is {}",
            max_guests
        )));
    }
    Ok(guests)
}
