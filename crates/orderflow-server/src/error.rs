use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orderflow_core::OrderError;
use orderflow_ingest::TransportError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    /// Order no encontrada
    NotFound { order_uid: String },

    /// Parametros invalidos
    BadRequest(String),

    /// El transporte de ingesta no acepta mensajes
    Unavailable(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound { order_uid } => AppError::NotFound { order_uid },
            OrderError::Validation(e) => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => AppError::Unavailable("ingestion is shutting down".into()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound { order_uid } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("Order not found: {}", order_uid),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", msg)
            },
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    msg,
                )
            },
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
