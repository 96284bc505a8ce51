//! Order endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use orderflow_core::Order;
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::{LimitQuery, OrderPath};
use crate::state::AppState;

/// Response de POST /orders.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// Offset asignado por el transporte.
    pub offset: u64,
}

/// GET /order/{id}
#[instrument(skip_all, fields(order_uid = %path.id))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(path): Path<OrderPath>,
) -> Result<Json<Arc<Order>>, AppError> {
    let order_uid = path.validate().map_err(AppError::BadRequest)?;

    let order = state.service().get_order(order_uid).await?;
    Ok(Json(order))
}

/// GET /orders?limit=N
/// Las orders mas recientes primero.
#[instrument(skip_all, fields(limit = query.limit))]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.service().get_last_orders(query.clamped()).await?;
    Ok(Json(orders))
}

/// POST /orders
///
/// Publica el body tal cual en el transporte de ingesta. La validacion
/// ocurre en el pipeline, un payload invalido termina como dead letter.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn publish_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublishResponse>), AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Request body cannot be empty".to_string()));
    }

    let offset = state.publisher().publish(body.to_vec()).await?;
    tracing::info!(offset, "Order published for ingestion");

    Ok((StatusCode::ACCEPTED, Json(PublishResponse { offset })))
}
