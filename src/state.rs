// src/state.rs
use crate::config::Config;
use crate::db::Database;
use crate::services::{IdentityConfig, IdentityService};

/// Everything a request handler needs. Shared read-only by all workers.
pub struct AppState {
    pub db: Database,
    pub identity: IdentityService,
}

impl AppState {
    pub fn new(db: Database, identity: IdentityConfig) -> Self {
        Self {
            db,
            identity: IdentityService::new(identity),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Database::new(&config.db_path),
            IdentityConfig {
                session_ttl_secs: config.session_ttl_secs,
                password_cost: config.password_cost,
            },
        )
    }
}
