//! Category Repository

use super::{BaseRepository, RepoError, RepoResult, new_record_id};
use crate::db::models::Category;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all categories ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find root categories ordered by name
    pub async fn find_roots(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category WHERE parent_id = NONE ORDER BY name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find direct children of a category, ordered by name
    pub async fn find_children(&self, parent_id: &RecordId) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category WHERE parent_id = $parent ORDER BY name")
            .bind(("parent", parent_id.clone()))
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Category>> {
        let category: Option<Category> = self.base.db().select(id.clone()).await?;
        Ok(category)
    }

    /// Find category by slug
    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a new category. Slug uniqueness is pre-checked by the service
    /// and enforced by the unique index.
    pub async fn create(&self, mut category: Category) -> RepoResult<Category> {
        let id = new_record_id(TABLE);
        category.id = None;
        let created: Option<Category> = self
            .base
            .db()
            .create(id)
            .content(category)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Merge partial update data into a category and return the new state
    pub async fn update(
        &self,
        id: &RecordId,
        data: impl serde::Serialize + Send + Sync + 'static,
    ) -> RepoResult<Category> {
        self.base
            .db()
            .query("UPDATE $id MERGE $data")
            .bind(("id", id.clone()))
            .bind(("data", data))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    /// Count products referencing a category (delete guard)
    pub async fn count_products(&self, id: &RecordId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM product WHERE category_id = $cat GROUP ALL")
            .bind(("cat", id.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Count direct child categories (delete guard)
    pub async fn count_children(&self, id: &RecordId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM category WHERE parent_id = $parent GROUP ALL")
            .bind(("parent", id.clone()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Hard delete a category
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<Category> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Category {id} not found")));
        }
        Ok(())
    }
}
