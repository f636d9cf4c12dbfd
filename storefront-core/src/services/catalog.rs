//! Catalog Service - Category tree and product management
//!
//! Authoritative owner of product and category state. Slugs are derived
//! from display names and kept unique; deletions are guarded so that order
//! history and the category tree never dangle.

use super::parse_id;
use crate::db::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::utils::time::now_rfc3339;
use crate::utils::{AppError, AppResult, generate_slug};
use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

/// Category with its subtree, assembled by [`CatalogService::category_tree`]
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

#[derive(Clone)]
pub struct CatalogService {
    categories: CategoryRepository,
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            categories: CategoryRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category; slug is generated from the name
    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let slug = generate_slug(&data.name);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Category name must contain at least one alphanumeric character".to_string(),
            ));
        }
        if self.categories.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(
                "Category with this name already exists".to_string(),
            ));
        }

        let parent_id = match data.parent_id.as_deref() {
            Some(parent) => {
                let parent_id = parse_id("category", parent)?;
                if self.categories.find_by_id(&parent_id).await?.is_none() {
                    return Err(AppError::NotFound("Parent category not found".to_string()));
                }
                Some(parent_id)
            }
            None => None,
        };

        let category = Category {
            id: None,
            name: data.name,
            slug,
            description: data.description,
            image: data.image,
            parent_id,
            created_at: now_rfc3339(),
        };
        Ok(self.categories.create(category).await?)
    }

    /// Update a category; renaming regenerates the slug
    pub async fn update_category(&self, id: &str, data: CategoryUpdate) -> AppResult<Category> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let id = parse_id("category", id)?;
        let existing = self
            .categories
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let mut slug = None;
        if let Some(ref new_name) = data.name
            && *new_name != existing.name
        {
            let new_slug = generate_slug(new_name);
            if new_slug.is_empty() {
                return Err(AppError::Validation(
                    "Category name must contain at least one alphanumeric character".to_string(),
                ));
            }
            if let Some(other) = self.categories.find_by_slug(&new_slug).await?
                && other.id != existing.id
            {
                return Err(AppError::Conflict(
                    "Category with this name already exists".to_string(),
                ));
            }
            slug = Some(new_slug);
        }

        let parent_id = match data.parent_id.as_deref() {
            Some(parent) => {
                let parent_id = parse_id("category", parent)?;
                if self.categories.find_by_id(&parent_id).await?.is_none() {
                    return Err(AppError::NotFound("Parent category not found".to_string()));
                }
                Some(parent_id)
            }
            None => None,
        };

        #[derive(Serialize)]
        struct CategoryMerge {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            slug: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            image: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            parent_id: Option<RecordId>,
        }

        let merge = CategoryMerge {
            name: data.name,
            slug,
            description: data.description,
            image: data.image,
            parent_id,
        };
        Ok(self.categories.update(&id, merge).await?)
    }

    /// Delete a category. Fails while products or child categories still
    /// reference it.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        let id = parse_id("category", id)?;
        if self.categories.find_by_id(&id).await?.is_none() {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        if self.categories.count_products(&id).await? > 0 {
            return Err(AppError::Validation(
                "Cannot delete category with products".to_string(),
            ));
        }
        if self.categories.count_children(&id).await? > 0 {
            return Err(AppError::Validation(
                "Cannot delete category with child categories".to_string(),
            ));
        }
        Ok(self.categories.delete(&id).await?)
    }

    /// Find a category by id
    pub async fn get_category(&self, id: &str) -> AppResult<Category> {
        let id = parse_id("category", id)?;
        self.categories
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    /// Find a category by slug
    pub async fn get_category_by_slug(&self, slug: &str) -> AppResult<Category> {
        self.categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    /// List root categories, or the children of `parent_id`, ordered by name
    pub async fn list_categories(&self, parent_id: Option<&str>) -> AppResult<Vec<Category>> {
        match parent_id {
            Some(parent) => {
                let parent_id = parse_id("category", parent)?;
                Ok(self.categories.find_children(&parent_id).await?)
            }
            None => Ok(self.categories.find_roots().await?),
        }
    }

    /// Assemble the full category tree, children ordered by name
    pub async fn category_tree(&self) -> AppResult<Vec<CategoryNode>> {
        let all = self.categories.find_all().await?;
        Ok(build_tree(&all, None))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product; slug is derived from the title
    pub async fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if data.price < Decimal::ZERO {
            return Err(AppError::Validation(
                "Price must not be negative".to_string(),
            ));
        }

        let slug = generate_slug(&data.title);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Title must contain at least one alphanumeric character".to_string(),
            ));
        }
        if self.products.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict(
                "Product with this title already exists".to_string(),
            ));
        }

        let category_id = parse_id("category", &data.category_id)?;
        if self.categories.find_by_id(&category_id).await?.is_none() {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        let now = now_rfc3339();
        let product = Product {
            id: None,
            title: data.title,
            slug,
            description: data.description,
            price: data.price,
            stock: data.stock.unwrap_or(0),
            unit: data.unit.unwrap_or_else(|| "kg".to_string()),
            images: data.images,
            attributes: data.attributes,
            category_id,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };
        Ok(self.products.create(product).await?)
    }

    /// Update a product; a title change regenerates the slug. Stock here is
    /// an absolute admin set, not a delta.
    pub async fn update_product(&self, id: &str, data: ProductUpdate) -> AppResult<Product> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if let Some(price) = data.price
            && price < Decimal::ZERO
        {
            return Err(AppError::Validation(
                "Price must not be negative".to_string(),
            ));
        }

        let id = parse_id("product", id)?;
        let existing = self
            .products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let mut slug = None;
        if let Some(ref new_title) = data.title
            && *new_title != existing.title
        {
            let new_slug = generate_slug(new_title);
            if new_slug.is_empty() {
                return Err(AppError::Validation(
                    "Title must contain at least one alphanumeric character".to_string(),
                ));
            }
            if let Some(other) = self.products.find_by_slug(&new_slug).await?
                && other.id != existing.id
            {
                return Err(AppError::Conflict(
                    "Product with this title already exists".to_string(),
                ));
            }
            slug = Some(new_slug);
        }

        #[derive(Serialize)]
        struct ProductMerge {
            #[serde(skip_serializing_if = "Option::is_none")]
            title: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            slug: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            price: Option<Decimal>,
            #[serde(skip_serializing_if = "Option::is_none")]
            stock: Option<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            unit: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            images: Option<Vec<String>>,
            #[serde(skip_serializing_if = "Option::is_none")]
            attributes: Option<serde_json::Value>,
            #[serde(skip_serializing_if = "Option::is_none")]
            is_active: Option<bool>,
            updated_at: String,
        }

        let merge = ProductMerge {
            title: data.title,
            slug,
            description: data.description,
            price: data.price,
            stock: data.stock,
            unit: data.unit,
            images: data.images,
            attributes: data.attributes,
            is_active: data.is_active,
            updated_at: now_rfc3339(),
        };
        Ok(self.products.update(&id, merge).await?)
    }

    /// Delete a product. Blocked while order history references it so that
    /// historical snapshots stay resolvable; cart lines and wishlist entries
    /// are cascaded. Deactivation is the retirement path for sold products.
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        let id = parse_id("product", id)?;
        if self.products.find_by_id(&id).await?.is_none() {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        if self.products.count_order_references(&id).await? > 0 {
            return Err(AppError::Validation(
                "Cannot delete product with order history".to_string(),
            ));
        }
        Ok(self.products.delete_cascade(&id).await?)
    }

    /// Find a product by id
    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        let id = parse_id("product", id)?;
        self.products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Find a product by slug
    pub async fn get_product_by_slug(&self, slug: &str) -> AppResult<Product> {
        self.products
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// List active products, optionally restricted to a category
    pub async fn list_products(&self, category_id: Option<&str>) -> AppResult<Vec<Product>> {
        match category_id {
            Some(category) => {
                let category_id = parse_id("category", category)?;
                Ok(self.products.find_by_category(&category_id).await?)
            }
            None => Ok(self.products.find_all_active().await?),
        }
    }

    /// Append an image URL to a product (no-op when already present)
    pub async fn add_product_image(&self, id: &str, image_url: &str) -> AppResult<Product> {
        let id = parse_id("product", id)?;
        let product = self
            .products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let mut images = product.images;
        if !images.iter().any(|img| img == image_url) {
            images.push(image_url.to_string());
        }
        self.set_product_images(&id, images).await
    }

    /// Remove an image URL from a product
    pub async fn remove_product_image(&self, id: &str, image_url: &str) -> AppResult<Product> {
        let id = parse_id("product", id)?;
        let product = self
            .products
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let images = product
            .images
            .into_iter()
            .filter(|img| img != image_url)
            .collect();
        self.set_product_images(&id, images).await
    }

    async fn set_product_images(&self, id: &RecordId, images: Vec<String>) -> AppResult<Product> {
        #[derive(Serialize)]
        struct ImagesMerge {
            images: Vec<String>,
            updated_at: String,
        }
        let merge = ImagesMerge {
            images,
            updated_at: now_rfc3339(),
        };
        Ok(self.products.update(id, merge).await?)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Atomically subtract stock; fails when the result would be negative
    pub async fn decrement_stock(&self, product_id: &str, amount: i64) -> AppResult<Product> {
        if amount <= 0 {
            return Err(AppError::Validation(
                "Stock amount must be greater than 0".to_string(),
            ));
        }
        let id = parse_id("product", product_id)?;
        Ok(self.products.decrement_stock(&id, amount).await?)
    }

    /// Restore previously reserved stock; saturating, no upper bound
    pub async fn increment_stock(&self, product_id: &str, amount: i64) -> AppResult<Product> {
        if amount <= 0 {
            return Err(AppError::Validation(
                "Stock amount must be greater than 0".to_string(),
            ));
        }
        let id = parse_id("product", product_id)?;
        Ok(self.products.increment_stock(&id, amount).await?)
    }
}

/// Recursively collect the children of `parent` (None for roots). Input is
/// name-ordered, and the order is preserved per level.
fn build_tree(all: &[Category], parent: Option<&RecordId>) -> Vec<CategoryNode> {
    all.iter()
        .filter(|c| c.parent_id.as_ref() == parent)
        .map(|c| CategoryNode {
            category: c.clone(),
            children: match &c.id {
                Some(id) => build_tree(all, Some(id)),
                None => Vec::new(),
            },
        })
        .collect()
}
