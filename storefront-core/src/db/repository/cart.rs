//! Cart Repository
//!
//! All multi-row cart mutations (line upsert, guest merge, reaping) are
//! single SurrealQL transactions: a crash mid-operation leaves either the
//! original state or the fully-applied state, never a half-merged cart.

use super::{BaseRepository, RepoError, RepoResult, database_error, new_record_id, transaction_errors};
use crate::db::models::{Cart, CartItem, CartItemDetail};
use crate::utils::time::now_rfc3339;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "cart";
const ITEM_TABLE: &str = "cart_item";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// Find cart by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Cart>> {
        let cart: Option<Cart> = self.base.db().select(id.clone()).await?;
        Ok(cart)
    }

    /// Find a user's cart
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Option<Cart>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE user_id = $uid LIMIT 1")
            .bind(("uid", user_id.to_string()))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    /// Find a guest cart by its opaque token
    pub async fn find_by_token(&self, guest_token: &str) -> RepoResult<Option<Cart>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE guest_token = $token LIMIT 1")
            .bind(("token", guest_token.to_string()))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    /// Return the user's cart, creating it when absent.
    ///
    /// find-or-create 在单个事务内执行，并发调用不会产生第二个购物车。
    pub async fn get_or_create_for_user(&self, user_id: &str) -> RepoResult<Cart> {
        let cart_id = new_record_id(TABLE);
        let now = now_rfc3339();
        let mut response = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 LET $existing = (SELECT * FROM cart WHERE user_id = $uid LIMIT 1);
                 IF array::len($existing) = 0 {
                     CREATE $cart CONTENT { user_id: $uid, created_at: $now, updated_at: $now };
                 };
                 COMMIT TRANSACTION;",
            )
            .bind(("uid", user_id.to_string()))
            .bind(("cart", cart_id))
            .bind(("now", now))
            .await?;

        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            return Err(database_error(errors));
        }

        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| RepoError::Database("Cart upsert yielded no cart".to_string()))
    }

    /// Create a fresh guest cart with the given token and expiry
    pub async fn create_guest(&self, guest_token: &str, expires_at: i64) -> RepoResult<Cart> {
        let now = now_rfc3339();
        let cart = Cart {
            id: None,
            user_id: None,
            guest_token: Some(guest_token.to_string()),
            expires_at: Some(expires_at),
            created_at: now.clone(),
            updated_at: now,
        };
        let created: Option<Cart> = self
            .base
            .db()
            .create(new_record_id(TABLE))
            .content(cart)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create guest cart".to_string()))
    }

    /// Push a guest cart's expiry forward (sliding TTL on access)
    pub async fn touch_guest(&self, id: &RecordId, expires_at: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET expires_at = $exp, updated_at = $now")
            .bind(("id", id.clone()))
            .bind(("exp", expires_at))
            .bind(("now", now_rfc3339()))
            .await?
            .check()?;
        Ok(())
    }

    /// Re-own a guest cart for a user (merge fast path: user had no cart)
    pub async fn adopt_guest_cart(&self, id: &RecordId, user_id: &str) -> RepoResult<Cart> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET user_id = $uid, guest_token = NONE, expires_at = NONE, \
                 updated_at = $now RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("uid", user_id.to_string()))
            .bind(("now", now_rfc3339()))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        carts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Cart {id} not found")))
    }

    /// Fold every guest line into the user cart and delete the guest cart,
    /// all in one transaction. Matching products sum quantities; the rest
    /// are created as new lines.
    pub async fn merge_into_user_cart(
        &self,
        guest_cart_id: &RecordId,
        guest_items: &[CartItem],
        user_cart_id: &RecordId,
    ) -> RepoResult<()> {
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for (i, _) in guest_items.iter().enumerate() {
            sql.push_str(&format!(
                "LET $e{i} = (SELECT * FROM cart_item WHERE cart_id = $user_cart AND product_id = $gp{i});\n\
                 IF array::len($e{i}) > 0 {{\n\
                     UPDATE cart_item SET quantity += $gq{i} WHERE cart_id = $user_cart AND product_id = $gp{i};\n\
                 }} ELSE {{\n\
                     CREATE $ni{i} CONTENT {{ cart_id: $user_cart, product_id: $gp{i}, quantity: $gq{i}, created_at: $now }};\n\
                 }};\n"
            ));
        }
        sql.push_str(
            "DELETE cart_item WHERE cart_id = $guest_cart;\n\
             DELETE $guest_cart;\n\
             UPDATE $user_cart SET updated_at = $now;\n\
             COMMIT TRANSACTION;",
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("user_cart", user_cart_id.clone()))
            .bind(("guest_cart", guest_cart_id.clone()))
            .bind(("now", now_rfc3339()));
        for (i, item) in guest_items.iter().enumerate() {
            query = query
                .bind((format!("gp{i}"), item.product_id.clone()))
                .bind((format!("gq{i}"), item.quantity))
                .bind((format!("ni{i}"), new_record_id(ITEM_TABLE)));
        }

        let mut response = query.await?;
        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            return Err(database_error(errors));
        }
        Ok(())
    }

    /// Delete a cart row (items are removed separately or by merge/reap)
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let _deleted: Option<Cart> = self.base.db().delete(id.clone()).await?;
        Ok(())
    }

    /// Reap expired guest carts together with their lines.
    ///
    /// Returns the number of carts removed. The expiry condition is
    /// re-checked inside the delete transaction so a cart refreshed between
    /// the scan and the delete survives.
    pub async fn delete_expired(&self, now_millis: i64) -> RepoResult<usize> {
        let ids: Vec<RecordId> = self
            .base
            .db()
            .query(
                "SELECT VALUE id FROM cart \
                 WHERE guest_token != NONE AND expires_at != NONE AND expires_at < $now",
            )
            .bind(("now", now_millis))
            .await?
            .take(0)?;

        if ids.is_empty() {
            return Ok(0);
        }

        let count = ids.len();
        let mut response = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 DELETE cart_item WHERE cart_id IN $ids \
                     AND cart_id.expires_at != NONE AND cart_id.expires_at < $now;
                 DELETE cart WHERE id IN $ids \
                     AND expires_at != NONE AND expires_at < $now;
                 COMMIT TRANSACTION;",
            )
            .bind(("ids", ids))
            .bind(("now", now_millis))
            .await?;

        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            return Err(database_error(errors));
        }
        Ok(count)
    }

    // =========================================================================
    // Cart items
    // =========================================================================

    /// Find a cart line by id
    pub async fn find_item(&self, id: &RecordId) -> RepoResult<Option<CartItem>> {
        let item: Option<CartItem> = self.base.db().select(id.clone()).await?;
        Ok(item)
    }

    /// Find a cart line by id with its product fetched
    pub async fn find_item_detail(&self, id: &RecordId) -> RepoResult<Option<CartItemDetail>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE id = $id FETCH product_id")
            .bind(("id", id.clone()))
            .await?;
        let items: Vec<CartItemDetail> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Raw lines of a cart
    pub async fn items(&self, cart_id: &RecordId) -> RepoResult<Vec<CartItem>> {
        let items: Vec<CartItem> = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE cart_id = $cart ORDER BY created_at")
            .bind(("cart", cart_id.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Lines of a cart with products fetched
    pub async fn items_with_products(&self, cart_id: &RecordId) -> RepoResult<Vec<CartItemDetail>> {
        let items: Vec<CartItemDetail> = self
            .base
            .db()
            .query(
                "SELECT * FROM cart_item WHERE cart_id = $cart ORDER BY created_at \
                 FETCH product_id",
            )
            .bind(("cart", cart_id.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Add `quantity` to the (cart, product) line, creating it when absent.
    /// The check-and-increment runs inside one transaction, so repeated adds
    /// always fold into a single row.
    pub async fn upsert_item(
        &self,
        cart_id: &RecordId,
        product_id: &RecordId,
        quantity: i64,
    ) -> RepoResult<CartItemDetail> {
        let mut response = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 LET $existing = (SELECT * FROM cart_item WHERE cart_id = $cart AND product_id = $product);
                 IF array::len($existing) > 0 {
                     UPDATE cart_item SET quantity += $qty WHERE cart_id = $cart AND product_id = $product;
                 } ELSE {
                     CREATE $item CONTENT { cart_id: $cart, product_id: $product, quantity: $qty, created_at: $now };
                 };
                 UPDATE $cart SET updated_at = $now;
                 COMMIT TRANSACTION;",
            )
            .bind(("cart", cart_id.clone()))
            .bind(("product", product_id.clone()))
            .bind(("qty", quantity))
            .bind(("item", new_record_id(ITEM_TABLE)))
            .bind(("now", now_rfc3339()))
            .await?;

        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            return Err(database_error(errors));
        }

        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM cart_item WHERE cart_id = $cart AND product_id = $product LIMIT 1 \
                 FETCH product_id",
            )
            .bind(("cart", cart_id.clone()))
            .bind(("product", product_id.clone()))
            .await?;
        let items: Vec<CartItemDetail> = result.take(0)?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Cart line upsert yielded no row".to_string()))
    }

    /// Set a line's quantity absolutely (not additive)
    pub async fn set_item_quantity(&self, id: &RecordId, quantity: i64) -> RepoResult<CartItem> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET quantity = $qty RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("qty", quantity))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Cart item {id} not found")))
    }

    /// Delete a single line
    pub async fn delete_item(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<CartItem> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Cart item {id} not found")));
        }
        Ok(())
    }

    /// Delete every line of a cart; the cart row persists
    pub async fn clear(&self, cart_id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE cart_item WHERE cart_id = $cart")
            .bind(("cart", cart_id.clone()))
            .await?
            .check()?;
        Ok(())
    }
}
