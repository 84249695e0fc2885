//! Public profiles, editable by their owner or an admin

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use rental_core::market::UserRepository;
use rental_core::user::{User, UserUpdate};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::admin::UserDeleted;
use super::views::ProfileView;
use crate::auth::{policy, AuthUser};
use crate::error::{ApiError, ApiJson, ApiResult, Envelope};
use crate::state::AppState;

/// Fields a user may change on their own profile
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<ProfileChanges> for UserUpdate {
    fn from(changes: ProfileChanges) -> Self {
        Self {
            first_name: changes.first_name,
            last_name: changes.last_name,
            email: changes.email,
            bio: changes.bio,
            profile_picture: changes.profile_picture,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub profile: ProfileView,
}

async fn find_profile(state: &AppState, username: &str) -> ApiResult<User> {
    state
        .store()
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Envelope<ProfilePayload>>> {
    let user = find_profile(&state, &username).await?;
    Ok(Envelope::ok(ProfilePayload {
        profile: ProfileView::from(&user),
    }))
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(username): Path<String>,
    ApiJson(changes): ApiJson<ProfileChanges>,
) -> ApiResult<Json<Envelope<ProfilePayload>>> {
    let user = find_profile(&state, &username).await?;
    policy::require_self_or_admin(&claims, &user)?;
    let updated = state.store().update_user(user.id, changes.into()).await?;
    info!(user_id = %updated.id, editor = %claims.id, "profile updated");
    Ok(Envelope::ok(ProfilePayload {
        profile: ProfileView::from(&updated),
    }))
}

async fn delete_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<Envelope<UserDeleted>>> {
    let user = find_profile(&state, &username).await?;
    policy::require_self_or_admin(&claims, &user)?;
    let deletion = state.store().delete_user(user.id).await?;
    info!(
        user_id = %user.id,
        deleted_by = %claims.id,
        properties_removed = deletion.properties_removed,
        bookings_removed = deletion.bookings_removed,
        "profile deleted"
    );
    Ok(Envelope::ok_with_message(
        "User and associated records deleted successfully",
        UserDeleted {
            properties_removed: deletion.properties_removed,
            bookings_removed: deletion.bookings_removed,
        },
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/profiles/{username}",
        get(get_profile).put(update_profile).delete(delete_profile),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rental_core::user::UserRole;
    use serde_json::json;

    use crate::routes::testing::{app, build_state, create_booking, create_listing, send, token_for};

    #[tokio::test]
    async fn public_profile_hides_role_and_credentials() {
        let (state, _tmp) = build_state().await;
        token_for(&state, "maya", UserRole::Host).await;

        let (status, body) = send(&app(&state), "GET", "/api/profiles/maya", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["username"], "maya");
        assert!(body["profile"].get("passwordHash").is_none());
        assert!(body["profile"].get("role").is_none());

        let (status, _) = send(&app(&state), "GET", "/api/profiles/nobody", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn only_self_or_admin_may_edit() {
        let (state, _tmp) = build_state().await;
        let maya = token_for(&state, "maya", UserRole::User).await;
        let other = token_for(&state, "other", UserRole::User).await;
        let admin = token_for(&state, "admin", UserRole::Admin).await;
        let app = app(&state);

        let (status, _) = send(
            &app,
            "PUT",
            "/api/profiles/maya",
            Some(&other),
            Some(json!({ "bio": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/profiles/maya",
            Some(&maya),
            Some(json!({ "bio": "Traveller" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["bio"], "Traveller");

        let (status, body) = send(
            &app,
            "PUT",
            "/api/profiles/maya",
            Some(&admin),
            Some(json!({ "lastName": "Lind" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["lastName"], "Lind");

        let (status, _) = send(
            &app,
            "PUT",
            "/api/profiles/maya",
            Some(&maya),
            Some(json!({ "role": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn self_delete_removes_listings_and_bookings() {
        let (state, _tmp) = build_state().await;
        let maya = token_for(&state, "maya", UserRole::Host).await;
        let guest = token_for(&state, "guest", UserRole::User).await;
        let app = app(&state);
        let listing = create_listing(&app, &maya, 4).await;
        create_booking(&app, &guest, &listing, "2031-04-01", "2031-04-02").await;

        let (status, body) = send(&app, "DELETE", "/api/profiles/maya", Some(&maya), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["propertiesRemoved"], 1);
        assert_eq!(body["bookingsRemoved"], 1);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/properties/{}", listing),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = send(&app, "GET", "/api/bookings", Some(&guest), None).await;
        assert_eq!(body["bookings"], json!([]));
    }

    #[tokio::test]
    async fn token_of_deleted_account_cannot_touch_reregistered_username() {
        let (state, _tmp) = build_state().await;
        let stale = token_for(&state, "maya", UserRole::User).await;
        let admin = token_for(&state, "admin", UserRole::Admin).await;
        let app = app(&state);

        let (status, _) = send(&app, "DELETE", "/api/profiles/maya", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let newcomer = json!({
            "username": "maya",
            "email": "new@example.com",
            "password": "password123"
        });
        let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(newcomer)).await;
        assert_eq!(status, StatusCode::CREATED);

        let bio = Some(json!({ "bio": "hijacked" }));
        let (status, _) = send(&app, "PUT", "/api/profiles/maya", Some(&stale), bio).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, "DELETE", "/api/profiles/maya", Some(&stale), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, "GET", "/api/profiles/maya", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["email"], "new@example.com");
        assert_eq!(body["profile"]["bio"], "");
    }
}
