//! Process configuration from environment variables (a `.env` file is honoured).

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub enum StoreConfig {
    /// Supabase project URL and API key.
    Postgrest { url: String, api_key: String },
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    /// Directory of the bundled frontend, served for every unmatched GET.
    pub static_dir: PathBuf,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match (get("SUPABASE_URL"), get("SUPABASE_KEY"), get("DATABASE_URL")) {
            (Some(url), Some(api_key), _) => StoreConfig::Postgrest { url, api_key },
            (Some(_), None, None) => return Err(ConfigError::Missing("SUPABASE_KEY")),
            (_, _, Some(database_url)) => StoreConfig::Postgres {
                database_url,
                max_connections: parse(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            },
            _ => return Err(ConfigError::NoStore),
        };

        let bcrypt_cost = parse(get("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Config {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(get("PORT"), "PORT", 3000)?,
            store,
            static_dir: get("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("dist")),
            bcrypt_cost,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}
