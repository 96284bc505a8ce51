//! Dead letter inspection.

use axum::{Json, extract::State};
use orderflow_ingest::DeadLetter;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeadLettersResponse {
    /// false si los dead letters solo van al log.
    pub retained: bool,
    pub count: usize,
    pub letters: Vec<DeadLetter>,
}

/// GET /dead-letters
pub async fn list_dead_letters(State(state): State<AppState>) -> Json<DeadLettersResponse> {
    let letters = state
        .dead_letters()
        .map(|sink| sink.letters())
        .unwrap_or_default();

    Json(DeadLettersResponse {
        retained: state.dead_letters().is_some(),
        count: letters.len(),
        letters,
    })
}
