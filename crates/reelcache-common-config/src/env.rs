//! Environment variable handling.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Cache
    pub const CACHE_TTL: &str = "CACHE_TTL";
    pub const CACHE_MAX_SIZE: &str = "CACHE_MAX_SIZE";
    pub const CACHE_SWEEP_INTERVAL: &str = "CACHE_SWEEP_INTERVAL";
    pub const USE_REDIS: &str = "USE_REDIS";
    pub const REDIS_URL: &str = "REDIS_URL";
    pub const REDIS_TIMEOUT_MS: &str = "REDIS_TIMEOUT_MS";
    pub const REDIS_KEY_PREFIX: &str = "REDIS_KEY_PREFIX";

    // Upstream metadata API
    pub const OMDB_API_KEY: &str = "OMDB_API_KEY";
    pub const OMDB_API_URL: &str = "OMDB_API_URL";
    pub const OMDB_TIMEOUT_SECS: &str = "OMDB_TIMEOUT_SECS";

    // Server
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const CORS_ORIGIN: &str = "CORS_ORIGIN";
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

    // Logging
    pub const REELCACHE_LOG_LEVEL: &str = "REELCACHE_LOG_LEVEL";
    pub const REELCACHE_LOG_FORMAT: &str = "REELCACHE_LOG_FORMAT";
    pub const REELCACHE_LOG_FILE: &str = "REELCACHE_LOG_FILE";
    pub const REELCACHE_LOG_SOURCE: &str = "REELCACHE_LOG_SOURCE";

    // Development
    pub const APP_ENV: &str = "APP_ENV";
    pub const RUST_LOG: &str = "RUST_LOG";
}

fn load_optional(file: &str) -> Result<(), EnvError> {
    match dotenvy::from_filename(file) {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Environment configuration.
pub struct Environment {
    _guard: (), // Prevent construction outside module
}

impl Environment {
    /// Initialize environment from .env files.
    ///
    /// Files are optional, but one that exists and fails to parse is an
    /// error. Variables already present in the process environment are
    /// never overridden.
    pub fn init() -> Result<Self, EnvError> {
        load_optional(".env")?;
        load_optional(".env.local")?;

        if let Ok(app_env) = env::var(vars::APP_ENV) {
            load_optional(&format!(".env.{}", app_env))?;
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        Self::get(var).unwrap_or_else(|| default.to_string())
    }

    /// Get a boolean variable (`true`, `1` and `yes` are truthy).
    pub fn get_bool(var: &str) -> Option<bool> {
        Self::get(var).map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Get an integer variable.
    pub fn get_int<T: FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match Self::get(var) {
            Some(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: format!("expected integer, got {:?}", v),
            }),
            None => Ok(None),
        }
    }
}
