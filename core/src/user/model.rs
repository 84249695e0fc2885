//! User model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Authorization role carried by every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Host,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Host => "host",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "host" => Ok(Self::Host),
            "admin" => Ok(Self::Admin),
            _ => Err(Error::InvalidInput(format!("Unsupported role '{}'", value))),
        }
    }
}

/// A stored account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Ids of the listings this user hosts
    #[serde(default)]
    pub properties: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Everything needed to register an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub role: UserRole,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            profile_picture: None,
            role: UserRole::default(),
        }
    }

    pub fn with_names(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_profile_picture(mut self, url: Option<String>) -> Self {
        self.profile_picture = sanitize_optional_string(url);
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Normalize and validate, producing the stored record
    pub fn into_user(self) -> Result<User> {
        if self.password_hash.is_empty() {
            return Err(Error::InvalidInput("Password hash cannot be empty".to_string()));
        }
        Ok(User {
            id: Uuid::new_v4(),
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            bio: String::new(),
            password_hash: self.password_hash,
            role: self.role,
            profile_picture: self.profile_picture,
            properties: Vec::new(),
            created_at: Utc::now(),
        })
    }
}

/// Partial edit of an account. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<UserRole>,
}

impl UserUpdate {
    /// Validate and write the changes into `user`
    pub fn apply(self, user: &mut User) -> Result<()> {
        if let Some(username) = self.username {
            user.username = normalize_username(&username)?;
        }
        if let Some(email) = self.email {
            user.email = normalize_email(&email)?;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(bio) = self.bio {
            user.bio = bio.trim().to_string();
        }
        if let Some(picture) = self.profile_picture {
            user.profile_picture = sanitize_optional_string(Some(picture));
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        Ok(())
    }
}

/// A user record without its credential
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: UserRole,
    pub profile_picture: Option<String>,
    pub properties: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            role: user.role,
            profile_picture: user.profile_picture.clone(),
            properties: user.properties.clone(),
            created_at: user.created_at,
        }
    }
}

/// The slice of a host that is embedded into populated listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for HostSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

pub fn normalize_email(email: &str) -> Result<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(Error::InvalidInput("Invalid email".to_string()));
    }
    Ok(normalized)
}

/// Usernames appear in URLs, so they cannot be blank or contain separators
pub fn normalize_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Username cannot be empty".to_string()));
    }
    if trimmed
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '/' | '?' | '#'))
    {
        return Err(Error::InvalidInput(format!(
            "Username '{}' contains invalid characters",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

fn sanitize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(" host ".parse::<UserRole>().unwrap(), UserRole::Host);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn new_user_normalizes_email_and_defaults_role() {
        let user = NewUser::new("alice", "  Alice@Example.COM ", "$2b$04$hash")
            .with_names("Alice", "Liddell")
            .into_user()
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, UserRole::User);
        assert!(user.properties.is_empty());
    }

    #[test]
    fn new_user_rejects_bad_username() {
        let result = NewUser::new("bad name", "a@example.com", "hash").into_user();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn update_clears_blank_profile_picture() {
        let mut user = NewUser::new("bob", "bob@example.com", "hash")
            .with_profile_picture(Some("https://img/bob.png".to_string()))
            .into_user()
            .unwrap();
        UserUpdate {
            profile_picture: Some("   ".to_string()),
            bio: Some(" hello ".to_string()),
            ..Default::default()
        }
        .apply(&mut user)
        .unwrap();
        assert!(user.profile_picture.is_none());
        assert_eq!(user.bio, "hello");
    }
}
