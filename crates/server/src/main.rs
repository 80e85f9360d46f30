mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::{error, info};
use transconnect::{bundle::BundleStore, eta::EtaService, route::RouteTable};

const PORT: u32 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().collect();
    if args.len() < 3 {
        error!("Usage: transconnect-server <route.csv> <bundle.json>");
        std::process::exit(1);
    }

    info!("Loading route table...");
    let route = RouteTable::load_csv(&args[1]).unwrap();

    // An unreadable or mismatched bundle must stop the server here, before
    // it accepts a single request.
    info!("Loading model bundle...");
    let store = BundleStore::new(args[2].as_str());
    let bundle = store.load().unwrap();
    info!("Serving with model {}", bundle.model_name());

    let service = EtaService::new()
        .with_route(route)
        .unwrap()
        .with_bundle(bundle)
        .unwrap();
    let state = Arc::new(AppState::new(service, store));

    let app = axum::Router::new()
        .route("/eta", get(api::eta))
        .route("/health", get(api::health))
        .route("/reload", post(api::reload))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT))
        .await
        .unwrap();
    info!("Listening to port {PORT}");
    axum::serve(listener, app).await.unwrap();
}
