use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rental_core::user::{User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// Longest lifetime a token may be issued with
pub const MAX_TTL_HOURS: i64 = 24 * 365;

/// Identity carried inside a signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: String,
    pub role: UserRole,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 tokens with the server secret
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Lifetimes beyond a year either way are clamped to `MAX_TTL_HOURS`
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours.clamp(-MAX_TTL_HOURS, MAX_TTL_HOURS)),
        }
    }

    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let expires_at = Utc::now() + self.ttl;
        let exp = usize::try_from(expires_at.timestamp())
            .map_err(|_| AuthError::Signing("Failed to encode token expiration".to_string()))?;
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_picture: user.profile_picture.clone().unwrap_or_default(),
            role: user.role,
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map(|token| IssuedToken { token, expires_at })
        .map_err(|err| AuthError::Signing(err.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|decoded| decoded.claims)
        .map_err(|err| AuthError::InvalidToken(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rental_core::user::NewUser;

    use super::*;

    fn host() -> User {
        NewUser::new("harriet", "harriet@example.com", "$2b$04$hash")
            .with_names("Harriet", "Vane")
            .with_role(UserRole::Host)
            .into_user()
            .unwrap()
    }

    #[test]
    fn issued_token_decodes_to_user_identity() {
        let issuer = TokenIssuer::new("test-secret", 24);
        let user = host();
        let issued = issuer.issue(&user).unwrap();

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "harriet");
        assert_eq!(claims.role, UserRole::Host);
        assert_eq!(claims.first_name, "Harriet");
        assert!(issued.expires_at > Utc::now() + Duration::hours(23));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = TokenIssuer::new("secret-a", 24).issue(&host()).unwrap();
        let result = TokenIssuer::new("secret-b", 24).verify(&issued.token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", -2);
        let issued = issuer.issue(&host()).unwrap();
        assert!(matches!(
            issuer.verify(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn oversized_lifetime_is_clamped() {
        let issued = TokenIssuer::new("test-secret", 9_000_000_000_000_000)
            .issue(&host())
            .unwrap();
        assert!(issued.expires_at <= Utc::now() + Duration::hours(MAX_TTL_HOURS));
        assert!(issued.expires_at > Utc::now() + Duration::hours(MAX_TTL_HOURS - 1));
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", 24);
        assert!(issuer.verify("not.a.jwt").is_err());
        assert!(issuer.verify("").is_err());
    }
}
