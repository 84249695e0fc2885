//! Host dashboard: a host's own listings and the bookings made on them

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use rental_core::booking::{Booking, BookingStatus, BookingUpdate};
use rental_core::market::{BookingRepository, PropertyRepository, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::bookings::{BookingPayload, BookingRef, BookingsPayload};
use super::properties::{
    edit_property, remove_property, PropertiesPayload, PropertyChanges, PropertyDeleted,
    PropertyPayload,
};
use super::views::Lookup;
use crate::auth::{policy, AuthUser, Claims};
use crate::error::{ApiError, ApiJson, ApiResult, Empty, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HostQuery {
    /// Username of the host to inspect; only the host themself or an admin
    pub host: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePropertyRequest {
    pub property_id: Uuid,
    pub updates: PropertyChanges,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyRef {
    pub property_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetStatusRequest {
    pub booking_id: Uuid,
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayload {
    pub pending_bookings: usize,
}

/// The host whose dashboard is requested: the caller unless `?host=` names
/// someone the caller may act for
async fn dashboard_host(state: &AppState, claims: &Claims, query: HostQuery) -> ApiResult<Uuid> {
    let Some(username) = query.host.filter(|name| !name.trim().is_empty()) else {
        return Ok(claims.id);
    };
    let host = state
        .store()
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("Host not found".to_string()))?;
    policy::require_self_or_admin(claims, &host)?;
    Ok(host.id)
}

/// Load a booking the caller may manage: the listing's host or an admin
async fn hosted_booking(state: &AppState, claims: &Claims, id: Uuid) -> ApiResult<Booking> {
    let booking = state
        .store()
        .get_booking(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;
    match state.store().get_property(booking.property).await? {
        Some(property) => policy::require_owner_or_admin(claims, property.host)?,
        None => policy::require_admin(claims)?,
    }
    Ok(booking)
}

async fn list_properties(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<HostQuery>,
) -> ApiResult<Json<Envelope<PropertiesPayload>>> {
    let host = dashboard_host(&state, &claims, query).await?;
    let properties = state.store().list_properties(Some(host)).await?;
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
    let property = edit_property(&state, &claims, req.property_id, req.updates).await?;
    Ok(Envelope::ok(PropertyPayload { property }))
}

async fn delete_property(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<PropertyRef>,
) -> ApiResult<Json<Envelope<PropertyDeleted>>> {
    let deleted = remove_property(&state, &claims, req.property_id).await?;
    Ok(Envelope::ok_with_message(
        "Property and associated bookings deleted successfully",
        deleted,
    ))
}

async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<HostQuery>,
) -> ApiResult<Json<Envelope<BookingsPayload>>> {
    let host = dashboard_host(&state, &claims, query).await?;
    let bookings = state.store().bookings_for_host(host).await?;
    let lookup = Lookup::load(state.store()).await?;
    Ok(Envelope::ok(BookingsPayload {
        bookings: lookup.bookings(bookings),
    }))
}

async fn set_booking_status(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<SetStatusRequest>,
) -> ApiResult<Json<Envelope<BookingPayload>>> {
    let booking = hosted_booking(&state, &claims, req.booking_id).await?;
    let updated = state
        .store()
        .update_booking(booking.id, BookingUpdate::status(req.status))
        .await?;
    info!(
        booking_id = %updated.id,
        from = %booking.status,
        to = %updated.status,
        by = %claims.id,
        "booking status changed"
    );

    let lookup = Lookup::load(state.store()).await?;
    Ok(Envelope::ok(BookingPayload {
        booking: lookup.booking(updated),
    }))
}

async fn delete_booking(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<BookingRef>,
) -> ApiResult<Json<Envelope<Empty>>> {
    let booking = hosted_booking(&state, &claims, req.booking_id).await?;
    if !state.store().delete_booking(booking.id).await? {
        return Err(ApiError::NotFound("Booking not found".to_string()));
    }
    Ok(Envelope::message("Booking deleted successfully"))
}

async fn pending_count(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<PendingPayload>>> {
    let pending_bookings = state
        .store()
        .bookings_for_host(claims.id)
        .await?
        .iter()
        .filter(|booking| booking.status == BookingStatus::Pending)
        .count();
    Ok(Envelope::ok(PendingPayload { pending_bookings }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/host/properties",
            get(list_properties)
                .put(update_property)
                .delete(delete_property),
        )
        .route(
            "/api/host/bookings",
            get(list_bookings)
                .put(set_booking_status)
                .delete(delete_booking),
        )
        .route("/api/host/bookings/pending", get(pending_count))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rental_core::user::UserRole;
    use serde_json::json;

    use crate::routes::testing::{
        app, build_state, create_booking, create_listing, send, token_for,
    };

    #[tokio::test]
    async fn host_approves_a_pending_booking() {
        let (state, _tmp) = build_state().await;
        let host = token_for(&state, "host", UserRole::Host).await;
        let guest = token_for(&state, "guest", UserRole::User).await;
        let app = app(&state);
        let property = create_listing(&app, &host, 4).await;
        let booking = create_booking(&app, &guest, &property, "2030-09-01", "2030-09-04").await;

        let (_, body) = send(&app, "GET", "/api/host/bookings/pending", Some(&host), None).await;
        assert_eq!(body["pendingBookings"], 1);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/host/bookings",
            Some(&host),
            Some(json!({ "bookingId": booking, "status": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["booking"]["status"], "approved");

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/bookings/{}", booking),
            Some(&guest),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["booking"]["status"], "approved");

        let (_, body) = send(&app, "GET", "/api/host/bookings/pending", Some(&host), None).await;
        assert_eq!(body["pendingBookings"], 0);
        let (_, body) = send(&app, "GET", "/api/host/bookings", Some(&host), None).await;
        assert_eq!(body["bookings"][0]["user"]["username"], "guest");
    }

    #[tokio::test]
    async fn other_hosts_cannot_manage_bookings_or_dashboards() {
        let (state, _tmp) = build_state().await;
        let host = token_for(&state, "host", UserRole::Host).await;
        let rival = token_for(&state, "rival", UserRole::Host).await;
        let guest = token_for(&state, "guest", UserRole::User).await;
        let admin = token_for(&state, "admin", UserRole::Admin).await;
        let app = app(&state);
        let property = create_listing(&app, &host, 4).await;
        let booking = create_booking(&app, &guest, &property, "2030-09-01", "2030-09-02").await;

        let (status, _) = send(
            &app,
            "PUT",
            "/api/host/bookings",
            Some(&rival),
            Some(json!({ "bookingId": booking, "status": "declined" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "GET",
            "/api/host/properties?host=host",
            Some(&rival),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(
            &app,
            "GET",
            "/api/host/properties?host=host",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["properties"].as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            "DELETE",
            "/api/host/bookings",
            Some(&admin),
            Some(json!({ "bookingId": booking })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn host_edits_and_deletes_listing_by_body_id() {
        let (state, _tmp) = build_state().await;
        let host = token_for(&state, "host", UserRole::Host).await;
        let guest = token_for(&state, "guest", UserRole::User).await;
        let app = app(&state);
        let property = create_listing(&app, &host, 4).await;
        create_booking(&app, &guest, &property, "2030-10-01", "2030-10-02").await;

        let (status, body) = send(
            &app,
            "PUT",
            "/api/host/properties",
            Some(&host),
            Some(json!({ "propertyId": property, "updates": { "maxGuests": 6 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["maxGuests"], 6);

        let (status, body) = send(
            &app,
            "DELETE",
            "/api/host/properties",
            Some(&host),
            Some(json!({ "propertyId": property })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bookingsRemoved"], 1);

        let (_, body) = send(&app, "GET", "/api/bookings", Some(&guest), None).await;
        assert_eq!(body["bookings"], json!([]));
    }
}
