//! Order Models
//!
//! An order is created atomically from a cart; `total_amount` and every
//! item's `price` are snapshots taken at creation time and never change,
//! regardless of later product price edits.

use super::product::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use surrealdb::RecordId;

pub type OrderId = RecordId;

// =============================================================================
// Order Status State Machine
// =============================================================================

/// Order lifecycle status.
///
/// Transitions follow an explicit table; anything not listed is rejected:
///
/// | From       | To                                |
/// |------------|-----------------------------------|
/// | PENDING    | PROCESSING, COMPLETED, CANCELLED  |
/// | PROCESSING | COMPLETED, CANCELLED              |
/// | COMPLETED  | (terminal)                        |
/// | CANCELLED  | (terminal)                        |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether the transition `self -> next` is legal
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Cancelled)
        )
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Wire representation, matches the stored value
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub user_id: String,
    /// Decimal snapshot computed once at creation; immutable afterwards
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Order line. Immutable after creation; `price` is the product's price at
/// order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub order_id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
    pub price: Decimal,
    pub created_at: String,
}

/// Order line with the product record fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub id: RecordId,
    pub order_id: RecordId,
    #[serde(rename = "product_id")]
    pub product: Product,
    pub quantity: i64,
    pub price: Decimal,
    pub created_at: String,
}

/// Fully populated order (returned by the order engine)
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

/// Staged order line handed to the repository when converting a cart.
/// `price` is the snapshot taken from the product at conversion time.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: RecordId,
    pub quantity: i64,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn forward_transitions_allowed() {
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Completed));
    }

    #[test]
    fn cancel_allowed_before_completion() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_are_sticky() {
        for next in [Pending, Processing, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn backward_transitions_rejected() {
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }
}
