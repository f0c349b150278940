/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration from
 * environment variables, and the optional PostgreSQL connection.
 *
 * # Variables
 *
 * | Variable             | Default            |
 * |----------------------|--------------------|
 * | `SERVER_PORT`        | `3000`             |
 * | `DATABASE_URL`       | unset (no database)|
 * | `JWT_SECRET`         | required in release builds |
 * | `TOKEN_TTL_SECS`     | `86400`            |
 * | `MESSAGE_PAGE_LIMIT` | `100`              |
 * | `DEFAULT_AVATAR_URL` | `/static/default-avatar.png` |
 * | `STATIC_DIR`         | `public`           |
 *
 * # Error Handling
 *
 * Malformed values are a `ConfigError` and stop startup. A database that
 * cannot be reached does not: the server runs without one and REST
 * endpoints answer `503`.
 */

use sqlx::PgPool;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "texting-development-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_SECRET must be set")]
    MissingSecret,
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// Default and maximum page size for message history
    pub message_page_limit: i64,
    pub default_avatar_url: String,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: 24 * 60 * 60,
            message_page_limit: 100,
            default_avatar_url: "/static/default-avatar.png".to_string(),
            static_dir: "public".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret.clone()
            }
            None => return Err(ConfigError::MissingSecret),
        };

        Ok(Self {
            port: parse_var(&lookup, "SERVER_PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            jwt_secret,
            token_ttl_secs: parse_var(&lookup, "TOKEN_TTL_SECS", defaults.token_ttl_secs)?,
            message_page_limit: parse_var(&lookup, "MESSAGE_PAGE_LIMIT", defaults.message_page_limit)?
                .max(1),
            default_avatar_url: lookup("DEFAULT_AVATAR_URL").unwrap_or(defaults.default_avatar_url),
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Connect to `database_url` and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
///
/// Migration failures are logged; the pool is still returned.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
