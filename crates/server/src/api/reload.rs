use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

/// Re-reads the bundle from disk and swaps it in atomically. Requests that
/// are mid-prediction finish against the bundle they already hold.
pub async fn reload(State(state): State<Arc<AppState>>) -> StatusCode {
    let bundle = match state.store.load() {
        Ok(bundle) => bundle,
        Err(err) => {
            error!(%err, "Keeping current bundle, reload failed");
            return StatusCode::UNPROCESSABLE_ENTITY;
        }
    };
    info!(model = %bundle.model_name(), "Swapping in reloaded bundle");
    match state.service.install_bundle(bundle) {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            error!(%err, "Failed to install bundle");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
