//! Registration, login and the current-user endpoint

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use rental_core::market::UserRepository;
use rental_core::user::{normalize_email, NewUser, UserRole, UserSummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{hash_password, validate_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiJson, ApiResult, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub profile_picture: Option<String>,
    /// `user` or `host`; admins are only ever seeded or promoted
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<UserPayload>>)> {
    let role = req.role.unwrap_or_default();
    if role.is_admin() {
        return Err(ApiError::Validation(
            "Role must be either user or host".to_string(),
        ));
    }
    validate_password(&req.password)?;
    let password_hash = hash_password(&req.password)?;

    let user = state
        .store()
        .create_user(
            NewUser::new(req.username, req.email, password_hash)
                .with_names(req.first_name, req.last_name)
                .with_profile_picture(req.profile_picture)
                .with_role(role),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Envelope::ok_with_message(
            "User created successfully",
            UserPayload {
                user: UserSummary::from(&user),
            },
        ),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<Envelope<LoginPayload>>> {
    let invalid = || ApiError::Validation("Invalid credentials".to_string());

    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let Some(user) = state.store().find_user_by_email(&email).await? else {
        debug!(%email, "login for unknown email");
        return Err(invalid());
    };
    if !verify_password(&user.password_hash, &req.password) {
        debug!(user_id = %user.id, "login with wrong password");
        return Err(invalid());
    }

    let issued = state.tokens().issue(&user)?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Envelope::ok_with_message(
        "User logged in successfully",
        LoginPayload {
            token: issued.token,
            expires_at: issued.expires_at,
        },
    ))
}

async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Envelope<UserPayload>>> {
    let user = state
        .store()
        .get_user(claims.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized: User not found".to_string()))?;
    Ok(Envelope::ok(UserPayload {
        user: UserSummary::from(&user),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
