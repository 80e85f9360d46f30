use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use transconnect::{eta, features::Condition, shared::geo::Coordinate};

use crate::{dto::EtaDto, state::AppState};

#[derive(Deserialize)]
pub struct EtaQuery {
    lat: f64,
    lon: f64,
    condition: String,
    hour: Option<u8>,
}

pub async fn eta(
    Query(params): Query<EtaQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<EtaDto>, StatusCode> {
    let coordinate =
        Coordinate::new(params.lat, params.lon).map_err(|_| StatusCode::BAD_REQUEST)?;
    let condition: Condition = params
        .condition
        .parse()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let estimate = match params.hour {
        Some(hour) => state.service.predict(coordinate, condition, hour),
        None => state.service.predict_at_current_hour(coordinate, condition),
    }
    .map_err(|err| match err {
        eta::Error::RouteNotLoaded | eta::Error::BundleNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        eta::Error::Geo(_) | eta::Error::Feature(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    })?;

    let model = state
        .service
        .bundle()
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(EtaDto::from(estimate, model.model_name())))
}
