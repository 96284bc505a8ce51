use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub cache: String,
    pub cached_orders: usize,
}

impl HealthResponse {
    fn new(state: &AppState, up: bool) -> Self {
        let service = state.service();
        Self {
            status: if up { "UP" } else { "DOWN" }.to_string(),
            storage: service.storage_name().to_string(),
            cache: service.cache_name().to_string(),
            cached_orders: service.cached_orders(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.service().health_check().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::new(&state, true))),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new(&state, false)),
            )
        },
    }
}
