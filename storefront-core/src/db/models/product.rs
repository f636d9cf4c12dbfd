//! Product Model
//!
//! `stock` is mutated only by the order engine (conditional decrement on
//! checkout, increment on cancellation) and by admin edits. It must never
//! go negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

pub type ProductId = RecordId;

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub title: String,
    /// URL slug derived from the title, unique across all products
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Unit price; order items snapshot this value at checkout
    pub price: Decimal,
    /// Available stock, never negative
    pub stock: i64,
    /// Sales unit, e.g. "kg"
    pub unit: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Free-form attribute mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
    pub category_id: RecordId,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub unit: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub attributes: Option<serde_json::Value>,
    /// Owning category id ("category:xxx")
    pub category_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    /// Absolute stock set (admin edit), not a delta
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub unit: Option<String>,
    pub images: Option<Vec<String>>,
    pub attributes: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}
