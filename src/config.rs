// src/config.rs
use std::{env, fmt, net::SocketAddr, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub workers: usize,
    pub db_path: String,
    pub schema_path: String,
    pub session_ttl_secs: i64,
    pub password_cost: u32,
    /// Create the demo volunteer account at startup.
    pub seed_demo: bool,
}

/// A variable that is set but cannot be parsed.
#[derive(Debug)]
pub struct ConfigError {
    pub key: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `load`, reading values through `lookup` instead of the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let workers: usize = try_load(&lookup, "VOLUNTEER_WORKERS", "8")?;
        if workers == 0 {
            return Err(ConfigError {
                key: "VOLUNTEER_WORKERS".into(),
                message: "must be at least 1".into(),
            });
        }
        let session_ttl_secs: i64 = try_load(&lookup, "VOLUNTEER_SESSION_TTL_SECS", "604800")?;
        if session_ttl_secs <= 0 {
            return Err(ConfigError {
                key: "VOLUNTEER_SESSION_TTL_SECS".into(),
                message: "must be positive".into(),
            });
        }

        let password_cost: u32 = try_load(&lookup, "VOLUNTEER_PASSWORD_COST", "12")?;
        if !(4..=31).contains(&password_cost) {
            return Err(ConfigError {
                key: "VOLUNTEER_PASSWORD_COST".into(),
                message: "must be between 4 and 31".into(),
            });
        }

        Ok(Self {
            addr: try_load(&lookup, "VOLUNTEER_ADDR", "127.0.0.1:3000")?,
            workers,
            db_path: try_load(&lookup, "VOLUNTEER_DB_PATH", "volunteer_match.sqlite3")?,
            schema_path: try_load(&lookup, "VOLUNTEER_SCHEMA_PATH", "sql/schema.sql")?,
            session_ttl_secs,
            password_cost,
            seed_demo: try_load(&lookup, "VOLUNTEER_SEED_DEMO", "false")?,
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError {
                key: key.to_string(),
                message: e.to_string(),
            }
        })
}
