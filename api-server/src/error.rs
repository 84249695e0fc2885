//! HTTP error type and the JSON envelope shared by every response

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// `{ success, message?, ...payload }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Payload for responses that carry nothing but the envelope
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data,
        })
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data,
        })
    }
}

impl Envelope<Empty> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Self::ok_with_message(message, Empty {})
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(%detail, "request failed");
                "Failed to process request".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(Envelope {
                success: false,
                message: Some(message),
                data: Empty {},
            }),
        )
            .into_response()
    }
}

impl From<rental_core::Error> for ApiError {
    fn from(err: rental_core::Error) -> Self {
        use rental_core::Error;
        match err {
            Error::UserNotFound(_) => Self::NotFound("User not found".to_string()),
            Error::PropertyNotFound(_) => Self::NotFound("Property not found".to_string()),
            Error::BookingNotFound(_) => Self::NotFound("Booking not found".to_string()),
            Error::InvalidInput(message) => Self::Validation(message),
            Error::Conflict(message) => Self::Conflict(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) => {
                Self::Unauthorized(format!("Unauthorized: {}", err))
            }
            AuthError::Forbidden(message) => Self::Forbidden(format!("Forbidden: {}", message)),
            AuthError::InvalidPassword(message) => Self::Validation(message),
            AuthError::Hashing(message) | AuthError::Signing(message) => Self::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// `Json` extractor whose rejection uses the envelope
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
