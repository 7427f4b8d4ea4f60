use crate::config::Config;
use crate::db::connection::init_db;
use crate::router::respond;
use crate::state::AppState;
use astra::Server;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod handlers;
mod requests;
mod responses;
mod router;
mod services;
mod state;


fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // 1. Configuration from the environment
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // 2. Database handle + schema
    let state = AppState::from_config(&config);
    if let Err(e) = init_db(&state.db, &config.schema_path) {
        error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    if config.seed_demo {
        let seeded = state
            .db
            .with_conn(|conn| state.identity.seed_demo_volunteer(conn, handlers::now()));
        if let Err(e) = seeded {
            error!("Seeding demo volunteer failed: {e}");
        }
    }

    // 3. Start the server
    info!(addr = %config.addr, workers = config.workers, "Starting server");
    let server = Server::bind(&config.addr).max_workers(config.workers);

    let result = server.serve(move |req, _info| respond(req, &state));

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
