//! Application configuration loaded from environment variables.

use crate::errors::{ApiError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub port: u16,
    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,
    /// Bearer token lifetime in hours
    pub token_ttl_hours: i64,
    /// Whether a donor may mark a confirmed reservation completed
    /// (the recipient always may)
    pub donor_may_complete: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./good2give.db".to_string()),
            port: env_var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid PORT".to_string()))?,
            jwt_secret: env_var("JWT_SECRET").map_err(|_| {
                ApiError::Config("JWT_SECRET environment variable is required".to_string())
            })?,
            token_ttl_hours: env_var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid TOKEN_TTL_HOURS".to_string()))?,
            donor_may_complete: env_var("DONOR_MAY_COMPLETE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid DONOR_MAY_COMPLETE".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ApiError::Config(format!("Missing env var: {key}")))
}
