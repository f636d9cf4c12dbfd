//! Cart Models
//!
//! A cart belongs to exactly one of {user, guest token}. Guest carts carry
//! an expiry timestamp and are reaped by a background task; merging a guest
//! cart into a user cart deletes the guest cart.

use super::product::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type CartId = RecordId;
pub type CartItemId = RecordId;

/// Cart model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    /// Owning user; `None` for guest carts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Opaque token identifying an anonymous session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
    /// Expiry in epoch millis; set for guest carts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Cart {
    /// Whether this is an anonymous-session cart
    pub fn is_guest(&self) -> bool {
        self.guest_token.is_some()
    }
}

/// Cart line. At most one row exists per (cart, product) pair; repeated
/// adds fold into `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartItemId>,
    pub cart_id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
    pub created_at: String,
}

/// Cart line with the product record fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemDetail {
    pub id: RecordId,
    pub cart_id: RecordId,
    #[serde(rename = "product_id")]
    pub product: Product,
    pub quantity: i64,
    pub created_at: String,
}

/// Cart summary computed from *current* product prices (orders snapshot
/// prices instead).
#[derive(Debug, Clone, Serialize)]
pub struct CartTotals {
    pub cart: Cart,
    pub items: Vec<CartItemDetail>,
    pub total: Decimal,
    /// Sum of line quantities
    pub item_count: i64,
}
