use serde::{Deserialize, Serialize};
use transconnect::eta::EtaEstimate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtaDto {
    pub eta_minutes: f64,
    pub nearest_stop_name: String,
    pub remaining_km: f64,
    pub model: String,
}

impl EtaDto {
    pub fn from(estimate: EtaEstimate, model: &str) -> Self {
        Self {
            eta_minutes: estimate.eta_minutes,
            nearest_stop_name: estimate.nearest_stop_name,
            remaining_km: estimate.remaining_km,
            model: model.to_string(),
        }
    }
}
