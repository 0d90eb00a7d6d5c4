pub use crate::common::RouteResult;

use std::sync::Arc;

use axum::{extract::FromRef, Router};
use parade::{devices::DeviceDirectory, BoatTracker, RouteMapper};
use tokio::net::TcpListener;

pub mod api;
pub mod common;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub mapper: Arc<RouteMapper>,
    pub tracker: Arc<BoatTracker>,
    pub devices: Arc<dyn DeviceDirectory>,
}

pub fn router(state: WebState) -> Router {
    Router::new().nest_service("/api", api::routes(state))
}

pub async fn start_web_server(state: WebState, bind_address: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    log::info!("listening on {}", bind_address);
    axum::serve(listener, router(state).into_make_service()).await?;

    Ok(())
}
