use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.service.route().is_ok() && state.service.bundle().is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
