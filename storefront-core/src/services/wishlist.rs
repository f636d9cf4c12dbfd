//! Wishlist Service

use super::{parse_id, require_id};
use crate::db::models::{WishlistEntry, WishlistEntryDetail};
use crate::db::repository::{ProductRepository, WishlistRepository};
use crate::utils::{AppError, AppResult};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct WishlistService {
    wishlist: WishlistRepository,
    products: ProductRepository,
}

impl WishlistService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            wishlist: WishlistRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Add a product to a user's wishlist; adding twice is a conflict
    pub async fn add(&self, user_id: &str, product_id: &str) -> AppResult<WishlistEntryDetail> {
        let product_id = parse_id("product", product_id)?;
        let product = self
            .products
            .find_by_id(&product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        if self.wishlist.find_entry(user_id, &product_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Product already in wishlist".to_string(),
            ));
        }

        let entry: WishlistEntry = self.wishlist.create(user_id, &product_id).await?;
        Ok(WishlistEntryDetail {
            id: require_id(&entry.id)?.clone(),
            user_id: entry.user_id,
            product,
            created_at: entry.created_at,
        })
    }

    /// Remove a product from a user's wishlist
    pub async fn remove(&self, user_id: &str, product_id: &str) -> AppResult<()> {
        let product_id = parse_id("product", product_id)?;
        if self.wishlist.find_entry(user_id, &product_id).await?.is_none() {
            return Err(AppError::NotFound(
                "Item not found in wishlist".to_string(),
            ));
        }
        Ok(self.wishlist.delete_entry(user_id, &product_id).await?)
    }

    /// A user's wishlist, newest first
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<WishlistEntryDetail>> {
        Ok(self.wishlist.list_for_user(user_id).await?)
    }

    /// Whether a product is in the user's wishlist
    pub async fn contains(&self, user_id: &str, product_id: &str) -> AppResult<bool> {
        let product_id = parse_id("product", product_id)?;
        Ok(self.wishlist.find_entry(user_id, &product_id).await?.is_some())
    }

    /// Number of wishlist entries for a user
    pub async fn count(&self, user_id: &str) -> AppResult<i64> {
        Ok(self.wishlist.count_for_user(user_id).await?)
    }

    /// Remove every entry of a user
    pub async fn clear(&self, user_id: &str) -> AppResult<()> {
        Ok(self.wishlist.clear_for_user(user_id).await?)
    }
}
