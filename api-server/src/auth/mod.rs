//! Authentication and authorization primitives.

mod password;
pub mod policy;
mod session;
mod token;

use thiserror::Error;

pub use password::{hash_password, validate_password, verify_password};
pub use session::AuthUser;
pub use token::{Claims, TokenIssuer, MAX_TTL_HOURS};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token required")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidPassword(String),
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error("Failed to sign token: {0}")]
    Signing(String),
}
