//! Cart Service - guest/user carts and the login-time merge
//!
//! Stock is deliberately NOT checked when items enter a cart; a cart may
//! hold more than the available stock. The check happens once, at
//! checkout, inside the order engine's transaction.

use super::{parse_id, require_id};
use crate::db::models::{Cart, CartItemDetail, CartTotals};
use crate::db::repository::{CartRepository, ProductRepository};
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

#[derive(Clone)]
pub struct CartService {
    carts: CartRepository,
    products: ProductRepository,
    /// Guest cart TTL in milliseconds
    guest_ttl_millis: i64,
}

impl CartService {
    pub fn new(db: Surreal<Db>, guest_cart_ttl_days: i64) -> Self {
        Self {
            carts: CartRepository::new(db.clone()),
            products: ProductRepository::new(db),
            guest_ttl_millis: guest_cart_ttl_days * 24 * 60 * 60 * 1000,
        }
    }

    fn fresh_expiry(&self) -> i64 {
        now_millis() + self.guest_ttl_millis
    }

    /// Resolve the caller's cart.
    ///
    /// - `user_id` given: the user's cart, created atomically when absent
    ///   (concurrent calls converge on one cart).
    /// - only `guest_token` given: that guest cart, with its expiry pushed
    ///   forward; unknown tokens are a NotFound error.
    /// - neither: a brand-new guest cart with a fresh opaque token.
    pub async fn get_or_create_cart(
        &self,
        user_id: Option<&str>,
        guest_token: Option<&str>,
    ) -> AppResult<Cart> {
        if let Some(user_id) = user_id {
            return Ok(self.carts.get_or_create_for_user(user_id).await?);
        }

        if let Some(token) = guest_token {
            let cart = self
                .carts
                .find_by_token(token)
                .await?
                .ok_or_else(|| AppError::NotFound("Cart not found for guest token".to_string()))?;
            let expires_at = self.fresh_expiry();
            self.carts.touch_guest(require_id(&cart.id)?, expires_at).await?;
            return Ok(Cart {
                expires_at: Some(expires_at),
                ..cart
            });
        }

        let token = Uuid::new_v4().to_string();
        Ok(self.carts.create_guest(&token, self.fresh_expiry()).await?)
    }

    /// Add `quantity` of a product to a cart. Folds into the existing line
    /// for the same product instead of creating a duplicate row.
    pub async fn add_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> AppResult<CartItemDetail> {
        if quantity <= 0 {
            return Err(AppError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }

        let cart_id = parse_id("cart", cart_id)?;
        if self.carts.find_by_id(&cart_id).await?.is_none() {
            return Err(AppError::NotFound("Cart not found".to_string()));
        }

        let product_id = parse_id("product", product_id)?;
        if self.products.find_by_id(&product_id).await?.is_none() {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        Ok(self.carts.upsert_item(&cart_id, &product_id, quantity).await?)
    }

    /// Set a line's quantity absolutely. A non-positive quantity removes the
    /// line; `None` is returned in that case.
    pub async fn update_item_quantity(
        &self,
        item_id: &str,
        quantity: i64,
    ) -> AppResult<Option<CartItemDetail>> {
        let item_id = parse_id("cart_item", item_id)?;
        if self.carts.find_item(&item_id).await?.is_none() {
            return Err(AppError::NotFound("Cart item not found".to_string()));
        }

        if quantity <= 0 {
            self.carts.delete_item(&item_id).await?;
            return Ok(None);
        }

        self.carts.set_item_quantity(&item_id, quantity).await?;
        let detail = self
            .carts
            .find_item_detail(&item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;
        Ok(Some(detail))
    }

    /// Remove a line. Removing an unknown line is a NotFound error.
    pub async fn remove_item(&self, item_id: &str) -> AppResult<()> {
        let item_id = parse_id("cart_item", item_id)?;
        Ok(self.carts.delete_item(&item_id).await?)
    }

    /// Cart contents priced at *current* product prices
    pub async fn totals(&self, cart_id: &str) -> AppResult<CartTotals> {
        let cart_id = parse_id("cart", cart_id)?;
        self.totals_by_id(&cart_id).await
    }

    async fn totals_by_id(&self, cart_id: &RecordId) -> AppResult<CartTotals> {
        let cart = self
            .carts
            .find_by_id(cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

        let items = self.carts.items_with_products(cart_id).await?;
        let total = items
            .iter()
            .map(|item| item.product.price * Decimal::from(item.quantity))
            .sum();
        let item_count = items.iter().map(|item| item.quantity).sum();

        Ok(CartTotals {
            cart,
            items,
            total,
            item_count,
        })
    }

    /// Delete every line of a cart; the cart itself persists
    pub async fn clear(&self, cart_id: &str) -> AppResult<()> {
        let cart_id = parse_id("cart", cart_id)?;
        if self.carts.find_by_id(&cart_id).await?.is_none() {
            return Err(AppError::NotFound("Cart not found".to_string()));
        }
        Ok(self.carts.clear(&cart_id).await?)
    }

    /// Merge a guest cart into the user's cart at login.
    ///
    /// When the user has no cart yet the guest cart is simply re-owned.
    /// Otherwise every guest line folds into the user cart (quantities
    /// summed per product) and the guest cart is deleted, all in one
    /// transaction. A failure mid-merge never duplicates or drops lines.
    pub async fn merge_guest_cart(&self, guest_token: &str, user_id: &str) -> AppResult<CartTotals> {
        let guest_cart = self
            .carts
            .find_by_token(guest_token)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest cart not found".to_string()))?;
        let guest_cart_id = require_id(&guest_cart.id)?.clone();

        let target_id = match self.carts.find_by_user(user_id).await? {
            None => {
                let adopted = self.carts.adopt_guest_cart(&guest_cart_id, user_id).await?;
                tracing::debug!(user_id, "Guest cart re-owned on login");
                require_id(&adopted.id)?.clone()
            }
            Some(user_cart) => {
                let user_cart_id = require_id(&user_cart.id)?.clone();
                let guest_items = self.carts.items(&guest_cart_id).await?;
                self.carts
                    .merge_into_user_cart(&guest_cart_id, &guest_items, &user_cart_id)
                    .await?;
                tracing::debug!(
                    user_id,
                    merged_lines = guest_items.len(),
                    "Guest cart merged into user cart"
                );
                user_cart_id
            }
        };

        self.totals_by_id(&target_id).await
    }
}
