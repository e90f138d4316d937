//! Configuration module for environment variables and application settings

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::database::RetryPolicy;

/// Upstream map list consumed by the sync job
pub const DEFAULT_MAPS_API_URL: &str = "https://valorant-api.com/v1/maps";

/// Variables that must be present (and non-empty) for the process to start
pub const REQUIRED_VARS: [&str; 8] = [
    "FRONTEND_PORT",
    "BACKEND_PORT",
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "ENVIRONMENT",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Map-sync job configuration
    pub sync: SyncConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub ssl: bool,
    /// Policy for the first connection at startup
    pub connect_policy: RetryPolicy,
    /// Policy applied after an established connection is lost
    pub reconnect_policy: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub maps_api_url: Url,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment. `main` has already
    /// merged `.env` into it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Every entry of [`REQUIRED_VARS`] is checked before anything is parsed,
    /// so the first missing name is always the one reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for key in REQUIRED_VARS {
            if get(key).is_none() {
                return Err(ConfigError::Missing(key));
            }
        }
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let frontend_port: u16 = parse_var("FRONTEND_PORT", required("FRONTEND_PORT")?)?;
        let backend_port: u16 = parse_var("BACKEND_PORT", required("BACKEND_PORT")?)?;

        let environment = match required("ENVIRONMENT")?.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "production" | "prod" => Environment::Production,
            other => {
                return Err(ConfigError::Invalid {
                    name: "ENVIRONMENT",
                    value: other.to_string(),
                    reason: "expected 'development' or 'production'".to_string(),
                });
            }
        };

        let mut allowed_origins = vec![format!("http://localhost:{}", frontend_port)];
        if let Some(extra) = get("CORS_ORIGINS") {
            allowed_origins.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string),
            );
        }

        let retry_delay = Duration::from_millis(match get("DB_RETRY_DELAY_MS") {
            Some(v) => parse_var("DB_RETRY_DELAY_MS", v)?,
            None => 2000,
        });
        let connect_retries: u32 = match get("DB_CONNECT_RETRIES") {
            Some(v) => parse_var("DB_CONNECT_RETRIES", v)?,
            None => 3,
        };
        let reconnect_policy = match get("DB_RECONNECT_MAX_ATTEMPTS") {
            Some(v) => RetryPolicy::bounded(parse_var("DB_RECONNECT_MAX_ATTEMPTS", v)?, retry_delay),
            None => RetryPolicy::unbounded(retry_delay),
        };

        let ssl = match get("DB_SSL") {
            Some(v) => parse_bool("DB_SSL", &v)?,
            None => false,
        };

        let maps_api_url = get("MAPS_API_URL").unwrap_or_else(|| DEFAULT_MAPS_API_URL.to_string());
        let maps_api_url = Url::parse(&maps_api_url).map_err(|e| ConfigError::Invalid {
            name: "MAPS_API_URL",
            value: maps_api_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            environment,
            database: DatabaseConfig {
                host: required("DB_HOST")?,
                port: parse_var("DB_PORT", required("DB_PORT")?)?,
                user: required("DB_USER")?,
                password: required("DB_PASSWORD")?,
                dbname: required("DB_NAME")?,
                ssl,
                connect_policy: RetryPolicy::bounded(connect_retries, retry_delay),
                reconnect_policy,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: backend_port,
                allowed_origins,
            },
            sync: SyncConfig {
                maps_api_url,
                timeout: Duration::from_secs(10),
            },
        })
    }
}

fn parse_var<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
