//! Listing routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rental_core::market::PropertyRepository;
use rental_core::property::{Location, NewProperty, Property, PropertyUpdate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::parse_id;
use super::views::{property_view, Lookup, PropertyView};
use crate::auth::{policy, AuthUser, Claims};
use crate::error::{ApiError, ApiJson, ApiResult, Envelope};
use crate::state::AppState;

const LATEST_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePropertyRequest {
    pub title: String,
    pub description: String,
    pub price_per_night: f64,
    pub location: Option<Location>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub max_guests: u32,
    pub rating: Option<u8>,
}

/// Editable listing fields; the host cannot be reassigned
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub location: Option<Location>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub max_guests: Option<u32>,
    pub rating: Option<u8>,
}

impl From<PropertyChanges> for PropertyUpdate {
    fn from(changes: PropertyChanges) -> Self {
        Self {
            title: changes.title,
            description: changes.description,
            price_per_night: changes.price_per_night,
            location: changes.location,
            images: changes.images,
            amenities: changes.amenities,
            max_guests: changes.max_guests,
            rating: changes.rating,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub host: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertyPayload {
    pub property: PropertyView,
}

#[derive(Debug, Serialize)]
pub struct PropertiesPayload {
    pub properties: Vec<PropertyView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeleted {
    pub bookings_removed: usize,
}

async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<PropertiesPayload>>> {
    let host = match query.host.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::Validation("Invalid host id".to_string()))?,
        ),
        _ => None,
    };
    let lookup = Lookup::hosts(state.store()).await?;
    let properties = state.store().list_properties(host).await?;
    Ok(Envelope::ok(PropertiesPayload {
        properties: lookup.properties(properties),
    }))
}

async fn latest_properties(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<PropertiesPayload>>> {
    let lookup = Lookup::hosts(state.store()).await?;
    let properties = state.store().latest_properties(LATEST_LIMIT).await?;
    Ok(Envelope::ok(PropertiesPayload {
        properties: lookup.properties(properties),
    }))
}

async fn create_property(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreatePropertyRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<PropertyPayload>>)> {
    let location = req
        .location
        .ok_or_else(|| ApiError::Validation("Please provide a valid location".to_string()))?;
    let property = state
        .store()
        .create_property(
            claims.id,
            NewProperty {
                title: req.title,
                description: req.description,
                price_per_night: req.price_per_night,
                location,
                images: req.images,
                amenities: req.amenities,
                max_guests: req.max_guests,
                rating: req.rating,
            },
        )
        .await?;

    let property = property_view(state.store(), property).await?;
    Ok((StatusCode::CREATED, Envelope::ok(PropertyPayload { property })))
}

async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<PropertyPayload>>> {
    let id = parse_id(&id, "Property not found")?;
    let property = state
        .store()
        .get_property(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;
    let property = property_view(state.store(), property).await?;
    Ok(Envelope::ok(PropertyPayload { property }))
}

async fn update_property(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<PropertyChanges>,
) -> ApiResult<Json<Envelope<PropertyPayload>>> {
    let id = parse_id(&id, "Property not found")?;
    let property = edit_property(&state, &claims, id, changes).await?;
    Ok(Envelope::ok(PropertyPayload { property }))
}

async fn delete_property(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<PropertyDeleted>>> {
    let id = parse_id(&id, "Property not found")?;
    let deleted = remove_property(&state, &claims, id).await?;
    Ok(Envelope::ok_with_message("Property deleted successfully", deleted))
}

/// Load a listing the caller may modify: its host or an admin
pub(super) async fn owned_property(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> ApiResult<Property> {
    let property = state
        .store()
        .get_property(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;
    policy::require_owner_or_admin(claims, property.host)?;
    Ok(property)
}

pub(super) async fn edit_property(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
    changes: PropertyChanges,
) -> ApiResult<PropertyView> {
    owned_property(state, claims, id).await?;
    let property = state.store().update_property(id, changes.into()).await?;
    info!(property_id = %id, editor = %claims.id, "property updated");
    property_view(state.store(), property).await
}

pub(super) async fn remove_property(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> ApiResult<PropertyDeleted> {
    owned_property(state, claims, id).await?;
    let deletion = state.store().delete_property(id).await?;
    info!(
        property_id = %id,
        deleted_by = %claims.id,
        bookings_removed = deletion.bookings_removed,
        "property deleted"
    );
    Ok(PropertyDeleted {
        bookings_removed: deletion.bookings_removed,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/properties",
            get(list_properties).post(create_property),
        )
        .route("/api/properties/latest", get(latest_properties))
        .route(
            "/api/properties/{id}",
            get(get_property)
                .put(update_property)
                .delete(delete_property),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rental_core::user::UserRole;
    use serde_json::json;

    use crate::routes::testing::{app, build_state, create_listing, listing, send, token_for};

    #[tokio::test]
    async fn created_listing_is_public_and_populated() {
        let (state, _tmp) = build_state().await;
        let host = token_for(&state, "hilde", UserRole::Host).await;
        let app = app(&state);

        let id = create_listing(&app, &host, 4).await;

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/properties/{}", id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["host"]["username"], "hilde");
        assert_eq!(body["property"]["rating"], 3);
        assert_eq!(body["property"]["reviews"], json!([]));

        let host_id = body["property"]["hostId"].as_str().unwrap().to_string();
        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/properties?host={}", host_id),
            None,
            None,
        )
        .await;
        assert_eq!(body["properties"].as_array().unwrap().len(), 1);

        let (_, body) = send(&app, "GET", "/api/profiles/hilde", None, None).await;
        assert_eq!(body["profile"]["properties"], json!([id]));
    }

    #[tokio::test]
    async fn create_requires_token_and_location() {
        let (state, _tmp) = build_state().await;
        let token = token_for(&state, "hilde", UserRole::Host).await;
        let app = app(&state);

        let (status, _) = send(&app, "POST", "/api/properties", None, Some(listing(2))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut missing_location = listing(2);
        missing_location.as_object_mut().unwrap().remove("location");
        let (status, body) = send(
            &app,
            "POST",
            "/api/properties",
            Some(&token),
            Some(missing_location),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please provide a valid location");
    }

    #[tokio::test]
    async fn latest_returns_newest_three() {
        let (state, _tmp) = build_state().await;
        let token = token_for(&state, "hilde", UserRole::Host).await;
        let app = app(&state);
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(create_listing(&app, &token, 2).await);
        }

        let (status, body) = send(&app, "GET", "/api/properties/latest", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let latest = body["properties"].as_array().unwrap();
        assert_eq!(latest.len(), 3);
        assert!(latest.iter().all(|property| property["id"] != ids[0].as_str()));
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_edit_or_delete() {
        let (state, _tmp) = build_state().await;
        let owner = token_for(&state, "owner", UserRole::Host).await;
        let stranger = token_for(&state, "stranger", UserRole::Host).await;
        let admin = token_for(&state, "admin", UserRole::Admin).await;
        let app = app(&state);
        let id = create_listing(&app, &owner, 2).await;
        let uri = format!("/api/properties/{}", id);

        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&stranger),
            Some(json!({ "title": "Mine" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&owner),
            Some(json!({ "pricePerNight": 120.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["property"]["pricePerNight"], 120.0);

        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&owner),
            Some(json!({ "host": "someone" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", &uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let (state, _tmp) = build_state().await;
        let (status, body) = send(
            &app(&state),
            "GET",
            "/api/properties/not-a-uuid",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Property not found");
    }
}
