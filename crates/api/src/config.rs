//! Server configuration loaded from environment variables.

use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Default value-added tax rate: 7% in basis points.
pub const DEFAULT_TAX_RATE_BP: i64 = 700;

/// A missing or unparseable environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Pool size (default: [`backoffice_db::DEFAULT_MAX_CONNECTIONS`]).
    pub db_max_connections: u32,
    /// Tax applied to the discounted subtotal, in basis points.
    pub tax_rate_bp: i64,
    /// Adds `Secure` to the session cookie. Disable only for plain-HTTP dev.
    pub session_cookie_secure: bool,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `DATABASE_URL`          | required                   |
    /// | `DB_MAX_CONNECTIONS`    | `20`                       |
    /// | `TAX_RATE_BP`           | `700`                      |
    /// | `SESSION_COOKIE_SECURE` | `true`                     |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", 3000u16)?;

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins.iter().find(|o| HeaderValue::from_str(o).is_err()) {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 30u64)?;
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections =
            parse_env("DB_MAX_CONNECTIONS", backoffice_db::DEFAULT_MAX_CONNECTIONS)?;

        let tax_rate_bp = parse_env("TAX_RATE_BP", DEFAULT_TAX_RATE_BP)?;
        if !(0..=backoffice_core::pricing::BASIS_POINTS).contains(&tax_rate_bp) {
            return Err(ConfigError::Invalid {
                name: "TAX_RATE_BP",
                value: tax_rate_bp.to_string(),
            });
        }

        let session_cookie_secure = parse_env("SESSION_COOKIE_SECURE", true)?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
            tax_rate_bp,
            session_cookie_secure,
            jwt,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

/// Parse an optional variable, using `default` when it is unset.
pub(crate) fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
