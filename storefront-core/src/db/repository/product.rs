//! Product Repository
//!
//! Owns the stock column. `decrement_stock` is a single conditional update
//! ("subtract N where stock >= N") so concurrent checkouts can never drive
//! stock negative; there is no read-then-write path.

use super::{BaseRepository, RepoError, RepoResult, new_record_id, transaction_errors};
use crate::db::models::Product;
use crate::utils::time::now_rfc3339;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active products ordered by title
    pub async fn find_all_active(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_active = true ORDER BY title")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find active products in a category, ordered by title
    pub async fn find_by_category(&self, category_id: &RecordId) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE category_id = $cat AND is_active = true ORDER BY title")
            .bind(("cat", category_id.clone()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Find product by slug
    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    pub async fn create(&self, mut product: Product) -> RepoResult<Product> {
        let id = new_record_id(TABLE);
        product.id = None;
        let created: Option<Product> = self.base.db().create(id).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Merge partial update data into a product and return the new state
    pub async fn update(
        &self,
        id: &RecordId,
        data: impl serde::Serialize + Send + Sync + 'static,
    ) -> RepoResult<Product> {
        self.base
            .db()
            .query("UPDATE $id MERGE $data")
            .bind(("id", id.clone()))
            .bind(("data", data))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    /// Count order lines referencing a product (delete guard: order history
    /// must keep its snapshots resolvable)
    pub async fn count_order_references(&self, id: &RecordId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM order_item WHERE product_id = $product GROUP ALL")
            .bind(("product", id.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Hard delete a product, cascading to cart lines and wishlist entries
    /// in the same transaction
    pub async fn delete_cascade(&self, id: &RecordId) -> RepoResult<()> {
        let mut response = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 DELETE cart_item WHERE product_id = $product;
                 DELETE wishlist WHERE product_id = $product;
                 DELETE $product;
                 COMMIT TRANSACTION;",
            )
            .bind(("product", id.clone()))
            .await?;

        let errors = transaction_errors(&mut response);
        if !errors.is_empty() {
            return Err(super::database_error(errors));
        }
        Ok(())
    }

    /// Atomically subtract `quantity` from stock, failing when the result
    /// would be negative. This is the only way stock decreases.
    pub async fn decrement_stock(&self, id: &RecordId, quantity: i64) -> RepoResult<Product> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET stock -= $qty, updated_at = $now WHERE stock >= $qty RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("qty", quantity))
            .bind(("now", now_rfc3339()))
            .await?;
        let updated: Vec<Product> = result.take(0)?;

        match updated.into_iter().next() {
            Some(product) => Ok(product),
            None => {
                // Distinguish "no such product" from "not enough stock"
                if self.find_by_id(id).await?.is_none() {
                    Err(RepoError::NotFound(format!("Product {id} not found")))
                } else {
                    Err(RepoError::InsufficientStock {
                        product_id: id.to_string(),
                        requested: quantity,
                    })
                }
            }
        }
    }

    /// Add `quantity` back to stock (order cancellation, admin correction).
    /// Always succeeds for an existing product.
    pub async fn increment_stock(&self, id: &RecordId, quantity: i64) -> RepoResult<Product> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET stock += $qty, updated_at = $now RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("qty", quantity))
            .bind(("now", now_rfc3339()))
            .await?;
        let updated: Vec<Product> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }
}
