//! Route handlers

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod host;
pub mod profiles;
pub mod properties;
mod views;

use axum::Router;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Every API route, ready for `with_state`
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(properties::router())
        .merge(bookings::router())
        .merge(host::router())
        .merge(admin::router())
        .merge(profiles::router())
}

/// Path ids that are not UUIDs can never match a document
fn parse_id(raw: &str, not_found: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(not_found.to_string()))
}
