//! Admin console routes. Every handler requires the admin role.

use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use rental_core::booking::{day, BookingStatus, BookingUpdate};
use rental_core::market::{BookingRepository, MarketStats, PropertyRepository, UserRepository};
use rental_core::user::{UserRole, UserSummary, UserUpdate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::bookings::{BookingPayload, BookingRef, BookingsPayload};
use super::host::{PropertyRef, UpdatePropertyRequest};
use super::properties::{
    edit_property, remove_property, PropertiesPayload, PropertyDeleted, PropertyPayload,
};
use super::views::Lookup;
use crate::auth::{policy, AuthUser};
use crate::error::{ApiError, ApiJson, ApiResult, Empty, Envelope};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<UserRole>,
}

impl From<UserChanges> for UserUpdate {
    fn from(changes: UserChanges) -> Self {
        Self {
            username: changes.username,
            email: changes.email,
            first_name: changes.first_name,
            last_name: changes.last_name,
            bio: changes.bio,
            profile_picture: changes.profile_picture,
            role: changes.role,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingChanges {
    #[serde(default, with = "day::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "day::option")]
    pub end_date: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub total_price: Option<f64>,
    pub special_requests: Option<String>,
    pub status: Option<BookingStatus>,
}

impl From<BookingChanges> for BookingUpdate {
    fn from(changes: BookingChanges) -> Self {
        Self {
            start_date: changes.start_date,
            end_date: changes.end_date,
            guests: changes.guests,
            total_price: changes.total_price,
            special_requests: changes.special_requests,
            status: changes.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserRef {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub user_id: Uuid,
    pub updates: UserChanges,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBookingRequest {
    pub booking_id: Uuid,
    pub updates: BookingChanges,
}

#[derive(Debug, Serialize)]
pub struct UsersPayload {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDeleted {
    pub properties_removed: usize,
    pub bookings_removed: usize,
}

async fn list_users(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<UsersPayload>>> {
    policy::require_admin(&claims)?;
    let users = state.store().list_users().await?;
    Ok(Envelope::ok(UsersPayload {
        users: users.iter().map(UserSummary::from).collect(),
    }))
}

async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<Envelope<UserPayload>>> {
    policy::require_admin(&claims)?;
    let user = state
        .store()
        .update_user(req.user_id, req.updates.into())
        .await?;
    info!(user_id = %user.id, role = %user.role, admin = %claims.id, "user updated by admin");
    Ok(Envelope::ok(UserPayload {
        user: UserSummary::from(&user),
    }))
}

async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UserRef>,
) -> ApiResult<Json<Envelope<UserDeleted>>> {
    policy::require_admin(&claims)?;
    let deletion = state.store().delete_user(req.user_id).await?;
    info!(
        user_id = %req.user_id,
        admin = %claims.id,
        properties_removed = deletion.properties_removed,
        bookings_removed = deletion.bookings_removed,
        "user deleted by admin"
    );
    Ok(Envelope::ok_with_message(
        "User, associated properties, and bookings deleted successfully",
        UserDeleted {
            properties_removed: deletion.properties_removed,
            bookings_removed: deletion.bookings_removed,
        },
    ))
}

async fn list_properties(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<PropertiesPayload>>> {
    policy::require_admin(&claims)?;
    let properties = state.store().list_properties(None).await?;
    let lookup = Lookup::hosts(state.store()).await?;
    Ok(Envelope::ok(PropertiesPayload {
        properties: lookup.properties(properties),
    }))
}

async fn update_property(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UpdatePropertyRequest>,
) -> ApiResult<Json<Envelope<PropertyPayload>>> {
    policy::require_admin(&claims)?;
    let property = edit_property(&state, &claims, req.property_id, req.updates).await?;
    Ok(Envelope::ok(PropertyPayload { property }))
}

async fn delete_property(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<PropertyRef>,
) -> ApiResult<Json<Envelope<PropertyDeleted>>> {
    policy::require_admin(&claims)?;
    let deleted = remove_property(&state, &claims, req.property_id).await?;
    Ok(Envelope::ok_with_message(
        "Property and associated bookings deleted successfully",
        deleted,
    ))
}

async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<BookingsPayload>>> {
    policy::require_admin(&claims)?;
    let bookings = state.store().list_bookings().await?;
    let lookup = Lookup::load(state.store()).await?;
    Ok(Envelope::ok(BookingsPayload {
        bookings: lookup.bookings(bookings),
    }))
}

async fn update_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UpdateBookingRequest>,
) -> ApiResult<Json<Envelope<BookingPayload>>> {
    policy::require_admin(&claims)?;
    let booking = state
        .store()
        .update_booking(req.booking_id, req.updates.into())
        .await?;
    info!(
        booking_id = %booking.id,
        status = %booking.status,
        admin = %claims.id,
        "booking updated by admin"
    );
    let lookup = Lookup::load(state.store()).await?;
    Ok(Envelope::ok(BookingPayload {
        booking: lookup.booking(booking),
    }))
}

async fn delete_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<BookingRef>,
) -> ApiResult<Json<Envelope<Empty>>> {
    policy::require_admin(&claims)?;
    if !state.store().delete_booking(req.booking_id).await? {
        return Err(ApiError::NotFound("Booking not found".to_string()));
    }
    Ok(Envelope::message("Booking deleted successfully"))
}

async fn stats(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<MarketStats>>> {
    policy::require_admin(&claims)?;
    Ok(Envelope::ok(state.store().stats().await))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/users",
            get(list_users).put(update_user).delete(delete_user),
        )
        .route(
            "/api/admin/properties",
            get(list_properties)
                .put(update_property)
                .delete(delete_property),
        )
        .route(
            "/api/admin/bookings",
            get(list_bookings)
                .put(update_booking)
                .delete(delete_booking),
        )
        .route("/api/admin/stats", get(stats))
}
