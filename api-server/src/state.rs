//! Application state

use std::sync::Arc;

use rental_core::market::FileMarketStore;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: FileMarketStore,
    tokens: TokenIssuer,
}

impl AppState {
    /// Open the market store described by `config`
    pub async fn new(config: &AppConfig) -> rental_core::Result<Self> {
        let store = FileMarketStore::new(config.store_path()).await?;
        let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl_hours);
        Ok(Self::with_parts(store, tokens))
    }

    pub fn with_parts(store: FileMarketStore, tokens: TokenIssuer) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, tokens }),
        }
    }

    /// Get reference to the market store
    pub fn store(&self) -> &FileMarketStore {
        &self.inner.store
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
