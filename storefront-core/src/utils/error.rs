//! Unified Error Handling
//!
//! Application-wide error taxonomy. Repository errors ([`RepoError`]) are
//! converted into [`AppError`] at the service boundary; the HTTP layer maps
//! these onto status codes.

use crate::db::models::OrderStatus;
use crate::db::repository::RepoError;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requested quantity exceeds available stock. Reports which product
    /// failed so multi-line checkouts can surface the offending line.
    #[error("Insufficient stock for product {product_id} (requested {requested})")]
    InsufficientStock { product_id: String, requested: i64 },

    /// Rejected order lifecycle transition
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error is caused by the caller (4xx-equivalent)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::InsufficientStock {
                product_id,
                requested,
            } => AppError::InsufficientStock {
                product_id,
                requested,
            },
            RepoError::Database(msg) => {
                tracing::error!(target: "database", error = %msg, "Database error occurred");
                AppError::Database(msg)
            }
        }
    }
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;
