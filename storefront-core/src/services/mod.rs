//! Business Services
//!
//! The operations exposed to the HTTP layer. Each service is constructed
//! with its repositories (no global store handle) and is cheap to clone.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use wishlist::WishlistService;

use crate::utils::{AppError, AppResult};
use surrealdb::RecordId;

/// Parse a caller-supplied `"table:key"` id and verify the table
pub(crate) fn parse_id(table: &str, id: &str) -> AppResult<RecordId> {
    let record_id: RecordId = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid id: {id}")))?;
    if record_id.table() != table {
        return Err(AppError::Validation(format!(
            "Expected a {table} id, got: {id}"
        )));
    }
    Ok(record_id)
}

/// Extract the id of a record loaded from storage
pub(crate) fn require_id(id: &Option<RecordId>) -> AppResult<&RecordId> {
    id.as_ref()
        .ok_or_else(|| AppError::Internal("Record is missing its id".to_string()))
}
