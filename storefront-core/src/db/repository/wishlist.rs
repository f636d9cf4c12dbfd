//! Wishlist Repository

use super::{BaseRepository, RepoError, RepoResult, new_record_id};
use crate::db::models::{WishlistEntry, WishlistEntryDetail};
use crate::utils::time::now_rfc3339;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "wishlist";

#[derive(Clone)]
pub struct WishlistRepository {
    base: BaseRepository,
}

impl WishlistRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the (user, product) entry
    pub async fn find_entry(
        &self,
        user_id: &str,
        product_id: &RecordId,
    ) -> RepoResult<Option<WishlistEntry>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM wishlist WHERE user_id = $uid AND product_id = $product LIMIT 1")
            .bind(("uid", user_id.to_string()))
            .bind(("product", product_id.clone()))
            .await?;
        let entries: Vec<WishlistEntry> = result.take(0)?;
        Ok(entries.into_iter().next())
    }

    /// Create an entry. The unique index on (user_id, product_id) rejects
    /// racing duplicates.
    pub async fn create(&self, user_id: &str, product_id: &RecordId) -> RepoResult<WishlistEntry> {
        let entry = WishlistEntry {
            id: None,
            user_id: user_id.to_string(),
            product_id: product_id.clone(),
            created_at: now_rfc3339(),
        };
        let created: Option<WishlistEntry> = self
            .base
            .db()
            .create(new_record_id(TABLE))
            .content(entry)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create wishlist entry".to_string()))
    }

    /// A user's wishlist, newest first, with products fetched
    pub async fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<WishlistEntryDetail>> {
        let entries: Vec<WishlistEntryDetail> = self
            .base
            .db()
            .query(
                "SELECT * FROM wishlist WHERE user_id = $uid ORDER BY created_at DESC \
                 FETCH product_id",
            )
            .bind(("uid", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Number of entries in a user's wishlist
    pub async fn count_for_user(&self, user_id: &str) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM wishlist WHERE user_id = $uid GROUP ALL")
            .bind(("uid", user_id.to_string()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Delete the (user, product) entry
    pub async fn delete_entry(&self, user_id: &str, product_id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE wishlist WHERE user_id = $uid AND product_id = $product")
            .bind(("uid", user_id.to_string()))
            .bind(("product", product_id.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// Delete every entry of a user
    pub async fn clear_for_user(&self, user_id: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE wishlist WHERE user_id = $uid")
            .bind(("uid", user_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}
