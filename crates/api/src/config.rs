//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Connection pool size (default: 5)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: Secret used to sign dealer access tokens (required)
//! - `JWT_TTL_HOURS`: Lifetime of an access token (default: 24)
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `APP_TIMEZONE`: IANA timezone that defines "today" (default: "UTC")

use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the Dealerbook API server
///
/// Covers networking, the database pool, logging, token signing and the
/// business timezone.
///
/// # Example
///
/// ```no_run
/// use dealerbook_api::config::ApiConfig;
///
/// fn example() -> eyre::Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Upper bound on pooled database connections
    pub database_max_connections: u32,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// HMAC secret for signing dealer tokens
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub jwt_ttl_hours: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Timezone in which schedule dates are compared with today
    pub timezone: Tz,
}

impl ApiConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or `JWT_SECRET` is missing, or when a numeric
    /// value or `APP_TIMEZONE` cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value for an environment key, or `None` when unset
    ///
    /// # Returns
    ///
    /// * `Result<ApiConfig>` - The parsed configuration, or the first invalid value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Network settings
        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "3000")
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = var("DATABASE_MAX_CONNECTIONS", "5")
            .parse()
            .wrap_err("Invalid DATABASE_MAX_CONNECTIONS value")?;

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Security settings
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| eyre!("JWT_SECRET environment variable must be set"))?;
        let jwt_ttl_hours = var("JWT_TTL_HOURS", "24")
            .parse()
            .wrap_err("Invalid JWT_TTL_HOURS value")?;

        // Performance settings
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS", "30").parse().unwrap_or(30);

        let timezone_name = var("APP_TIMEZONE", "UTC");
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid APP_TIMEZONE value '{}': {}", timezone_name, e))?;

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            jwt_secret,
            jwt_ttl_hours,
            request_timeout,
            timezone,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
