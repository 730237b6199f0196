//! Configuration module for the portfolio backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Secret used to sign tokens when `JWT_SECRET` is unset outside production.
const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be set in production")]
    Missing(&'static str),
}

/// Credentials for the hosted media service.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Base folder that uploads are stored under
    pub folder: String,
}

/// Admin account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human readable text
    pub log_json: bool,
    /// Deployment environment name (`production` hides error details)
    pub environment: String,
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime in days
    pub jwt_expires_in_days: i64,
    /// Public frontend origin allowed by CORS
    pub frontend_url: Option<String>,
    /// Media host credentials, `None` when uploads are disabled
    pub media: Option<MediaConfig>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("TATTOO_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let bind_raw =
            env::var("TATTOO_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "TATTOO_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let log_level = env::var("TATTOO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("TATTOO_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let environment = env::var("TATTOO_ENV").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = match non_empty("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "production" => return Err(ConfigError::Missing("JWT_SECRET")),
            None => DEV_JWT_SECRET.to_string(),
        };

        let expiry_raw = env::var("JWT_EXPIRES_IN_DAYS").unwrap_or_else(|_| "7".to_string());
        let jwt_expires_in_days = expiry_raw
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN_DAYS",
                value: expiry_raw.clone(),
            })?;

        let media = match (
            non_empty("CLOUDINARY_CLOUD_NAME"),
            non_empty("CLOUDINARY_API_KEY"),
            non_empty("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(MediaConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: non_empty("CLOUDINARY_FOLDER")
                    .unwrap_or_else(|| "daniela-tattoos".to_string()),
            }),
            _ => None,
        };

        let bootstrap_admin = match (
            non_empty("TATTOO_ADMIN_EMAIL"),
            non_empty("TATTOO_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: non_empty("TATTOO_ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            environment,
            jwt_secret,
            jwt_expires_in_days,
            frontend_url: non_empty("FRONTEND_URL"),
            media,
            bootstrap_admin,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
