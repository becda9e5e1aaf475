//! Shared application state for all routes. Built once at startup and cloned into every handler.

use crate::config::{Config, StoreConfig};
use crate::error::StoreError;
use crate::password::PasswordPolicy;
use crate::store::{PgStore, PostgrestStore, RowStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub passwords: Arc<PasswordPolicy>,
}

impl AppState {
    pub fn new(store: Arc<dyn RowStore>, passwords: PasswordPolicy) -> Self {
        AppState {
            store,
            passwords: Arc::new(passwords),
        }
    }

    /// Build the configured store backend. No connection is attempted here.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store: Arc<dyn RowStore> = match &config.store {
            StoreConfig::Postgrest { url, api_key } => {
                tracing::info!(%url, "using PostgREST row store");
                Arc::new(PostgrestStore::new(url, api_key)?)
            }
            StoreConfig::Postgres {
                database_url,
                max_connections,
            } => {
                tracing::info!(max_connections, "using Postgres row store");
                Arc::new(PgStore::connect_lazy(database_url, *max_connections)?)
            }
        };
        Ok(Self::new(store, PasswordPolicy::new(config.bcrypt_cost)))
    }
}
