//! Error types for Orderflow.
//!
//! Errors on the synchronous read/write path are values of [`OrderError`].
//! The ingestion path converts them into retry or dead-letter decisions, so
//! the only thing it needs from an error is [`OrderError::is_transient`].
//!
//! # Example
//!
//! ```
//! use orderflow_core::{OrderError, Result};
//!
//! fn find(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(OrderError::validation("order_uid", "is required"));
//!     }
//!     Err(OrderError::not_found(id))
//! }
//!
//! assert!(find("b563feb7b2b84b6test").unwrap_err().is_not_found());
//! assert!(!find("").unwrap_err().is_transient());
//! ```

use thiserror::Error;

/// A single failed validation rule.
///
/// `field` is a dotted path into the order (`payment.amount`,
/// `items[2].sale`) so logs point at the offending value directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    /// Path of the field that failed validation.
    pub field: String,
    /// Description of the violated rule.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefixes the field path with a parent segment.
    pub fn within(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

/// Main error type for order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order is absent from every tier. Surfaced, never retried.
    #[error("order not found: {order_uid}")]
    NotFound {
        /// Identifier that was requested
        order_uid: String,
    },

    /// The order payload is malformed. Permanent.
    #[error("invalid order: {0}")]
    Validation(#[from] ValidationError),

    /// The durable store failed. Transient.
    #[error("storage error: {message}")]
    Storage {
        /// Description of what went wrong
        message: String,
    },

    /// The cache backend reported an internal failure.
    #[error("cache error: {0}")]
    Cache(String),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OrderError {
    /// Creates a NotFound error.
    pub fn not_found(order_uid: impl Into<String>) -> Self {
        Self::NotFound {
            order_uid: order_uid.into(),
        }
    }

    /// Creates a Validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, message))
    }

    /// Creates a Storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a Cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the order was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the operation might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Cache(_))
    }
}

/// Type alias for Results with OrderError.
pub type Result<T> = std::result::Result<T, OrderError>;
