//! Runtime configuration read from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::MAX_TTL_HOURS;

const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_DATA_DIR: &str = ".rental-data";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid RENTAL_BIND_ADDR '{0}'")]
    InvalidBindAddr(String),
    #[error("invalid RENTAL_TOKEN_TTL_HOURS '{0}', expected 1 to 8760 hours")]
    InvalidTokenTtl(String),
}

/// Credentials of the admin account created at startup
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let bind_addr = match value("RENTAL_BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidBindAddr(raw))?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(DEFAULT_BIND_ADDR.to_string()))?,
        };

        let token_ttl_hours = match value("RENTAL_TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| (1..=MAX_TTL_HOURS).contains(ttl))
                .ok_or(ConfigError::InvalidTokenTtl(raw))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let admin = match (
            value("RENTAL_ADMIN_USERNAME"),
            value("RENTAL_ADMIN_EMAIL"),
            value("RENTAL_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            data_dir: value("RENTAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            bind_addr,
            jwt_secret: value("RENTAL_JWT_SECRET")
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            token_ttl_hours,
            admin,
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("market.json")
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
