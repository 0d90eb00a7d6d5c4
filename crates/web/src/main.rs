use std::sync::Arc;

use database::{DatabaseConnectionInfo, PgDatabase};
use parade::{store::MemoryCache, BoatTracker, ParadeConfig, RouteMapper};
use web::{start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ParadeConfig::from_env().expect("invalid parade configuration");
    log::info!(
        "route has {} waypoints over {} m",
        config.route.points().len(),
        config.route.total_distance()
    );

    let mapper = RouteMapper::with_tolerance(
        config.route.clone(),
        config.settings.mapping_tolerance_meters,
    );
    let mut tracker = BoatTracker::new(config.settings.clone(), config.route.total_distance())
        .with_cache(Arc::new(MemoryCache::new()));

    // database
    match DatabaseConnectionInfo::from_env() {
        Some(database_connection_info) => {
            match PgDatabase::connect(database_connection_info).await {
                Ok(database) => tracker = tracker.with_persistence(Arc::new(database)),
                Err(why) => log::warn!(
                    "could not connect to database, positions are kept in memory only: {}",
                    why
                ),
            }
        }
        None => log::warn!("no database configured, positions are kept in memory only"),
    }

    // web server
    let state = WebState {
        mapper: Arc::new(mapper),
        tracker: Arc::new(tracker),
        devices: Arc::new(config.devices),
    };
    if let Err(why) = start_web_server(state, &config.bind_address).await {
        log::error!("web server stopped: {}", why);
    }
}
