//! Order Repository
//!
//! Order creation is the one place stock decreases and it happens inside a
//! single transaction together with the order/line inserts and the cart
//! clear: either every line's conditional stock decrement succeeds and the
//! order exists, or nothing is persisted. Cancellation mirrors this with
//! stock restoration plus the status flip in one transaction.

use super::{
    BaseRepository, ERR_ALREADY_CANCELLED, ERR_CANCEL_COMPLETED, ERR_INSUFFICIENT_STOCK,
    ERR_ORDER_NOT_FOUND, RepoError, RepoResult, database_error, find_marker, new_record_id,
    transaction_errors,
};
use crate::db::models::{NewOrderLine, Order, OrderItem, OrderItemDetail, OrderStatus};
use crate::utils::time::now_rfc3339;
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";
const ITEM_TABLE: &str = "order_item";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// Raw lines of an order
    pub async fn items(&self, order_id: &RecordId) -> RepoResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order_id = $order ORDER BY created_at")
            .bind(("order", order_id.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Lines of an order with products fetched
    pub async fn items_with_products(&self, order_id: &RecordId) -> RepoResult<Vec<OrderItemDetail>> {
        let items: Vec<OrderItemDetail> = self
            .base
            .db()
            .query(
                "SELECT * FROM order_item WHERE order_id = $order ORDER BY created_at \
                 FETCH product_id",
            )
            .bind(("order", order_id.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// A user's orders, newest first
    pub async fn find_by_user(&self, user_id: &str, limit: i64, start: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE user_id = $uid \
                 ORDER BY created_at DESC LIMIT $limit START $start",
            )
            .bind(("uid", user_id.to_string()))
            .bind(("limit", limit))
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders, newest first, optionally filtered by status
    pub async fn find_all(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        start: i64,
    ) -> RepoResult<Vec<Order>> {
        let sql = match status {
            Some(_) => {
                "SELECT * FROM order WHERE status = $status \
                 ORDER BY created_at DESC LIMIT $limit START $start"
            }
            None => "SELECT * FROM order ORDER BY created_at DESC LIMIT $limit START $start",
        };
        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(status) = status {
            query = query.bind(("status", status.as_str()));
        }
        let orders: Vec<Order> = query.await?.take(0)?;
        Ok(orders)
    }

    /// Convert staged cart lines into a persisted order.
    ///
    /// Per line the transaction issues a conditional decrement and aborts
    /// with a marker naming the product when stock is short; the order and
    /// its lines are created and the source cart cleared only when every
    /// decrement held.
    pub async fn create_from_cart(
        &self,
        user_id: &str,
        cart_id: &RecordId,
        total_amount: Decimal,
        lines: &[NewOrderLine],
    ) -> RepoResult<Order> {
        let order_id = new_record_id(TABLE);
        let now = now_rfc3339();

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for (i, line) in lines.iter().enumerate() {
            // 条件扣减：库存不足时 THROW 回滚整个事务
            sql.push_str(&format!(
                "LET $u{i} = (UPDATE $p{i} SET stock -= $q{i}, updated_at = $now WHERE stock >= $q{i} RETURN AFTER);\n\
                 IF array::len($u{i}) = 0 {{ THROW \"{ERR_INSUFFICIENT_STOCK}{}|{}\" }};\n",
                line.product_id, line.quantity
            ));
        }
        sql.push_str("CREATE $order CONTENT $order_data;\n");
        for i in 0..lines.len() {
            sql.push_str(&format!("CREATE $i{i} CONTENT $item{i};\n"));
        }
        sql.push_str(
            "DELETE cart_item WHERE cart_id = $cart;\n\
             UPDATE $cart SET updated_at = $now;\n\
             COMMIT TRANSACTION;",
        );

        let order = Order {
            id: None,
            user_id: user_id.to_string(),
            total_amount,
            status: OrderStatus::Pending,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("order", order_id.clone()))
            .bind(("order_data", order))
            .bind(("cart", cart_id.clone()))
            .bind(("now", now.clone()));
        for (i, line) in lines.iter().enumerate() {
            let item = OrderItem {
                id: None,
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.price,
                created_at: now.clone(),
            };
            query = query
                .bind((format!("p{i}"), line.product_id.clone()))
                .bind((format!("q{i}"), line.quantity))
                .bind((format!("i{i}"), new_record_id(ITEM_TABLE)))
                .bind((format!("item{i}"), item));
        }

        let mut response = query.await?;
        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            if let Some(payload) = find_marker(&errors, ERR_INSUFFICIENT_STOCK) {
                return Err(parse_insufficient_stock(&payload));
            }
            return Err(database_error(errors));
        }

        self.find_by_id(&order_id)
            .await?
            .ok_or_else(|| RepoError::Database("Order creation yielded no order".to_string()))
    }

    /// Persist a validated status transition. The expected current status is
    /// re-checked in the update so a concurrent transition loses cleanly.
    pub async fn set_status(
        &self,
        id: &RecordId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET status = $next, updated_at = $now \
                 WHERE status = $expected RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("next", next.as_str()))
            .bind(("expected", expected.as_str()))
            .bind(("now", now_rfc3339()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!(
                "Order {id} is no longer {expected}; transition to {next} rejected"
            ))
        })
    }

    /// Cancel an order: restore stock for every line and flip the status in
    /// one transaction. The status guard runs inside the transaction, so a
    /// second cancel can never restore stock twice.
    pub async fn cancel(&self, id: &RecordId, items: &[OrderItem]) -> RepoResult<Order> {
        let mut sql = String::from(
            "BEGIN TRANSACTION;\n\
             LET $current = (SELECT VALUE status FROM $order)[0];\n",
        );
        sql.push_str(&format!(
            "IF $current = NONE {{ THROW \"{ERR_ORDER_NOT_FOUND}\" }};\n\
             IF $current = \"COMPLETED\" {{ THROW \"{ERR_CANCEL_COMPLETED}\" }};\n\
             IF $current = \"CANCELLED\" {{ THROW \"{ERR_ALREADY_CANCELLED}\" }};\n"
        ));
        for (i, _) in items.iter().enumerate() {
            sql.push_str(&format!(
                "UPDATE $p{i} SET stock += $q{i}, updated_at = $now;\n"
            ));
        }
        sql.push_str(
            "UPDATE $order SET status = \"CANCELLED\", updated_at = $now;\n\
             COMMIT TRANSACTION;",
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("order", id.clone()))
            .bind(("now", now_rfc3339()));
        for (i, item) in items.iter().enumerate() {
            query = query
                .bind((format!("p{i}"), item.product_id.clone()))
                .bind((format!("q{i}"), item.quantity));
        }

        let mut response = query.await?;
        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            if find_marker(&errors, ERR_ORDER_NOT_FOUND).is_some() {
                return Err(RepoError::NotFound(format!("Order {id} not found")));
            }
            if find_marker(&errors, ERR_CANCEL_COMPLETED).is_some() {
                return Err(RepoError::Validation(
                    "Cannot cancel completed order".to_string(),
                ));
            }
            if find_marker(&errors, ERR_ALREADY_CANCELLED).is_some() {
                return Err(RepoError::Validation(
                    "Order is already cancelled".to_string(),
                ));
            }
            return Err(database_error(errors));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }
}

/// Parse `"<product_id>|<quantity>"` from a stock guard marker
fn parse_insufficient_stock(payload: &str) -> RepoError {
    let (product_id, requested) = match payload.split_once('|') {
        Some((pid, qty)) => (
            pid.to_string(),
            qty.split_whitespace()
                .next()
                .and_then(|q| q.parse().ok())
                .unwrap_or(0),
        ),
        None => (payload.to_string(), 0),
    };
    RepoError::InsufficientStock {
        product_id,
        requested,
    }
}
