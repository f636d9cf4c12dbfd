//! Repository Module
//!
//! Storage operations per entity. Multi-row mutations run as single
//! SurrealQL transactions; guard failures inside a transaction abort it via
//! `THROW` with a machine-readable marker that is mapped back onto
//! [`RepoError`] variants here.

// Catalog
pub mod category;
pub mod product;

// Cart
pub mod cart;

// Orders
pub mod order;

// Wishlist
pub mod wishlist;

// Re-exports
pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use wishlist::WishlistRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;
use uuid::Uuid;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock for {product_id} (requested {requested})")]
    InsufficientStock { product_id: String, requested: i64 },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations surface as generic DB errors; classify by
        // message so racing writers still get the Duplicate kind.
        if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Transaction guard markers
// =============================================================================
//
// THROW 中止整个事务；消息携带标记供 Rust 侧还原成类型化错误。

pub(crate) const ERR_INSUFFICIENT_STOCK: &str = "INSUFFICIENT_STOCK:";
pub(crate) const ERR_ORDER_NOT_FOUND: &str = "ORDER_NOT_FOUND";
pub(crate) const ERR_CANCEL_COMPLETED: &str = "CANCEL_COMPLETED";
pub(crate) const ERR_ALREADY_CANCELLED: &str = "ALREADY_CANCELLED";

/// Drain statement errors from a transaction response. When the transaction
/// was cancelled by a THROW every statement reports an error; the thrown
/// message is the interesting one, the rest are cancellation noise.
pub(crate) fn transaction_errors(response: &mut surrealdb::Response) -> Vec<String> {
    response
        .take_errors()
        .into_values()
        .map(|e| e.to_string())
        .collect()
}

/// Find the marker payload in a batch of transaction errors.
///
/// Returns `Some(rest_of_message)` for the first error containing `marker`.
pub(crate) fn find_marker(errors: &[String], marker: &str) -> Option<String> {
    errors.iter().find_map(|msg| {
        msg.find(marker)
            .map(|pos| msg[pos + marker.len()..].trim().to_string())
    })
}

/// Fallback mapping for transaction errors with no recognized marker
pub(crate) fn database_error(errors: Vec<String>) -> RepoError {
    RepoError::Database(errors.join("; "))
}

/// Generate a fresh record id for `table`
pub(crate) fn new_record_id(table: &str) -> RecordId {
    RecordId::from_table_key(table, Uuid::new_v4().simple().to_string())
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
