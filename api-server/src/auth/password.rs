use bcrypt::{hash, verify};

use super::AuthError;

const MIN_PASSWORD_LEN: usize = 8;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidPassword(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// bcrypt hash in modular crypt format (`$2b$<cost>$...`)
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, HASH_COST).map_err(|err| AuthError::Hashing(err.to_string()))
}

/// Malformed stored hashes never verify
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    verify(password, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_hashed_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "correct horsE"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password(&first, "password123"));
        assert!(verify_password(&second, "password123"));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for stored in ["", "v1$salt$digest", "$2b$", "$2b$04$tooshort", "plaintext"] {
            assert!(!verify_password(stored, "anything"));
        }
    }

    #[test]
    fn stored_cost_is_embedded_in_hash() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with(&format!("$2b${:02}$", HASH_COST)));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
