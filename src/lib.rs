//! Supply desk: REST backend for item requests, inventory and notifications over a managed Postgres store.

pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod table;
pub mod transform;

pub use config::{Config, StoreConfig};
pub use error::{AppError, ConfigError, StoreError};
pub use password::PasswordPolicy;
pub use routes::{api_routes, app, app_with_assets, common_routes, db_routes, static_assets};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, PostgrestStore, RowStore};
pub use table::Table;
