//! Wishlist Model

use super::product::Product;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Wishlist entry. At most one row exists per (user, product) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: String,
    pub product_id: RecordId,
    pub created_at: String,
}

/// Wishlist entry with the product record fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntryDetail {
    pub id: RecordId,
    pub user_id: String,
    #[serde(rename = "product_id")]
    pub product: Product,
    pub created_at: String,
}
