//! Order Service - atomic checkout and the order lifecycle
//!
//! The one place where money, stock and cart state move together. Prices
//! are snapshotted at creation; later product price changes never affect a
//! placed order.

use super::{parse_id, require_id};
use crate::db::models::{NewOrderLine, Order, OrderDetail, OrderStatus};
use crate::db::repository::{CartRepository, OrderRepository};
use crate::utils::{AppError, AppResult};
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    carts: CartRepository,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            carts: CartRepository::new(db),
        }
    }

    /// Convert a cart into an order.
    ///
    /// Validates the cart, snapshots prices into staged lines, then hands
    /// the whole conversion (conditional stock decrements + order insert +
    /// cart clear) to a single storage transaction. On insufficient stock
    /// the error names the offending product and nothing is persisted.
    pub async fn create_order_from_cart(&self, user_id: &str, cart_id: &str) -> AppResult<OrderDetail> {
        let cart_id = parse_id("cart", cart_id)?;
        if self.carts.find_by_id(&cart_id).await?.is_none() {
            return Err(AppError::NotFound("Cart not found".to_string()));
        }

        let cart_items = self.carts.items_with_products(&cart_id).await?;
        if cart_items.is_empty() {
            return Err(AppError::Validation("Cart is empty".to_string()));
        }

        let mut total_amount = Decimal::ZERO;
        let mut lines = Vec::with_capacity(cart_items.len());
        for item in &cart_items {
            total_amount += item.product.price * Decimal::from(item.quantity);
            lines.push(NewOrderLine {
                product_id: require_id(&item.product.id)?.clone(),
                quantity: item.quantity,
                price: item.product.price,
            });
        }

        let order = self
            .orders
            .create_from_cart(user_id, &cart_id, total_amount, &lines)
            .await?;
        let order_id = require_id(&order.id)?;
        tracing::info!(
            order_id = %order_id,
            user_id,
            lines = lines.len(),
            total = %order.total_amount,
            "Order created from cart"
        );

        self.detail(order_id, order.clone()).await
    }

    /// Fetch an order. When `user_id` is given, orders of other users are
    /// reported as not found rather than forbidden.
    pub async fn get_order(&self, order_id: &str, user_id: Option<&str>) -> AppResult<OrderDetail> {
        let order_id = parse_id("order", order_id)?;
        let order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if let Some(user_id) = user_id
            && order.user_id != user_id
        {
            return Err(AppError::NotFound("Order not found".to_string()));
        }

        self.detail(&order_id, order).await
    }

    /// A user's orders, newest first
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
        start: i64,
    ) -> AppResult<Vec<Order>> {
        Ok(self
            .orders
            .find_by_user(user_id, limit.clamp(1, 100), start.max(0))
            .await?)
    }

    /// All orders, newest first, optionally filtered by status
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        start: i64,
    ) -> AppResult<Vec<Order>> {
        Ok(self
            .orders
            .find_all(status, limit.clamp(1, 100), start.max(0))
            .await?)
    }

    /// Advance an order through its lifecycle.
    ///
    /// Transitions are validated against the state-machine table; anything
    /// not listed (backward moves, transitions out of terminal states)
    /// fails with a typed error. Transitioning to CANCELLED routes through
    /// [`cancel`](Self::cancel) so stock restoration is never skipped.
    pub async fn set_status(&self, order_id: &str, next: OrderStatus) -> AppResult<OrderDetail> {
        if next == OrderStatus::Cancelled {
            return self.cancel(order_id).await;
        }

        let order_id = parse_id("order", order_id)?;
        let order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let updated = self.orders.set_status(&order_id, order.status, next).await?;
        tracing::info!(order_id = %order_id, from = %order.status, to = %next, "Order status updated");
        self.detail(&order_id, updated).await
    }

    /// Cancel an order, restoring every line's stock.
    ///
    /// The exact inverse of creation: each order item's quantity is added
    /// back to its product, atomically with the status flip. Completed
    /// orders cannot be cancelled; a second cancel is rejected and never
    /// double-restores stock.
    pub async fn cancel(&self, order_id: &str) -> AppResult<OrderDetail> {
        let order_id = parse_id("order", order_id)?;
        let order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        match order.status {
            OrderStatus::Completed => {
                return Err(AppError::Validation(
                    "Cannot cancel completed order".to_string(),
                ));
            }
            OrderStatus::Cancelled => {
                return Err(AppError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Cancelled,
                });
            }
            OrderStatus::Pending | OrderStatus::Processing => {}
        }

        let items = self.orders.items(&order_id).await?;
        let cancelled = self.orders.cancel(&order_id, &items).await?;
        tracing::info!(order_id = %order_id, restored_lines = items.len(), "Order cancelled, stock restored");
        self.detail(&order_id, cancelled).await
    }

    async fn detail(&self, order_id: &RecordId, order: Order) -> AppResult<OrderDetail> {
        let items = self.orders.items_with_products(order_id).await?;
        Ok(OrderDetail { order, items })
    }
}
