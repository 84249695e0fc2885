//! Guest booking routes and the public availability endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rental_core::booking::{availability, day, Availability, DateRange, NewBooking};
use rental_core::market::{BookingRepository, PropertyRepository};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_id;
use super::views::{BookingView, Lookup};
use crate::auth::{policy, policy::Canceller, AuthUser};
use crate::error::{ApiError, ApiJson, ApiResult, Empty, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub property: Uuid,
    #[serde(with = "day")]
    pub start_date: NaiveDate,
    #[serde(with = "day")]
    pub end_date: NaiveDate,
    pub guests: u32,
    pub special_requests: Option<String>,
    /// Client-side quote; the stored price is always recomputed
    pub total_price: Option<f64>,
}

/// Body naming a single booking
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingRef {
    pub booking_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingPayload {
    pub booking: BookingView,
}

#[derive(Debug, Serialize)]
pub struct BookingsPayload {
    pub bookings: Vec<BookingView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedRangesPayload {
    pub booked_ranges: Vec<DateRange>,
}

async fn create_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<BookingPayload>>)> {
    let booking = state
        .store()
        .create_booking(
            claims.id,
            NewBooking {
                property: req.property,
                start_date: req.start_date,
                end_date: req.end_date,
                guests: req.guests,
                special_requests: req.special_requests,
            },
        )
        .await?;

    if let Some(quoted) = req.total_price {
        if (quoted - booking.total_price).abs() > f64::EPSILON {
            debug!(
                booking_id = %booking.id,
                quoted,
                charged = booking.total_price,
                "client quote differs from server price"
            );
        }
    }

    let lookup = Lookup::load(state.store()).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok_with_message(
            "Booking created successfully",
            BookingPayload {
                booking: lookup.booking(booking),
            },
        ),
    ))
}

async fn list_my_bookings(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<BookingsPayload>>> {
    let bookings = state.store().bookings_for_guest(claims.id).await?;
    let lookup = Lookup::load(state.store()).await?;
    Ok(Envelope::ok(BookingsPayload {
        bookings: lookup.bookings(bookings),
    }))
}

/// Guests may withdraw pending requests; admins may remove any booking
async fn cancel_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<BookingRef>,
) -> ApiResult<Json<Envelope<Empty>>> {
    let booking = state
        .store()
        .get_booking(req.booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    let canceller = policy::cancel_right(&claims, &booking)?;
    if canceller == Canceller::Guest && !booking.status.guest_can_cancel() {
        return Err(ApiError::Validation(
            "Only pending bookings can be canceled".to_string(),
        ));
    }

    if !state.store().delete_booking(booking.id).await? {
        return Err(ApiError::NotFound("Booking not found".to_string()));
    }
    info!(booking_id = %booking.id, cancelled_by = %claims.id, ?canceller, "booking cancelled");
    Ok(Envelope::message("Booking canceled successfully"))
}

async fn get_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<BookingPayload>>> {
    let id = parse_id(&id, "Booking not found")?;
    let booking = state
        .store()
        .get_booking(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;
    let listing_host = state
        .store()
        .get_property(booking.property)
        .await?
        .map(|property| property.host);
    policy::require_booking_viewer(&claims, &booking, listing_host)?;

    let lookup = Lookup::load(state.store()).await?;
    Ok(Envelope::ok(BookingPayload {
        booking: lookup.booking(booking),
    }))
}

async fn booked_ranges(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> ApiResult<Json<Envelope<BookedRangesPayload>>> {
    let property = listing_id(&state, &property_id).await?;
    let bookings = state.store().bookings_for_property(property).await?;
    Ok(Envelope::ok(BookedRangesPayload {
        booked_ranges: availability::booked_ranges(&bookings),
    }))
}

async fn check_availability(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<Envelope<Availability>>> {
    let property = listing_id(&state, &property_id).await?;
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(ApiError::Validation(
            "startDate and endDate are required".to_string(),
        ));
    };
    let candidate = DateRange::new(day::parse_day(&start)?, day::parse_day(&end)?)?;

    let bookings = state.store().bookings_for_property(property).await?;
    Ok(Envelope::ok(availability::check(&bookings, candidate)))
}

/// Resolve a path listing id, failing with 404 when it does not exist
async fn listing_id(state: &AppState, raw: &str) -> ApiResult<Uuid> {
    let id = parse_id(raw, "Property not found")?;
    state
        .store()
        .get_property(id)
        .await?
        .map(|property| property.id)
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/bookings",
            get(list_my_bookings)
                .post(create_booking)
                .delete(cancel_booking),
        )
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/property/{property_id}", get(booked_ranges))
        .route(
            "/api/bookings/property/{property_id}/availability",
            get(check_availability),
        )
}
