//! Shared test fixtures: isolated in-memory state + catalog seeding

use rust_decimal::Decimal;
use storefront_core::AppState;
use storefront_core::db::models::{CategoryCreate, ProductCreate};

/// Fresh, fully isolated application state
pub async fn state() -> AppState {
    AppState::in_memory().await.expect("in-memory state")
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

/// Create a category and return its id
pub async fn seed_category(state: &AppState, name: &str) -> String {
    let category = state
        .catalog()
        .create_category(CategoryCreate {
            name: name.to_string(),
            description: None,
            image: None,
            parent_id: None,
        })
        .await
        .expect("seed category");
    category.id.expect("category id").to_string()
}

/// Create a product and return its id
pub async fn seed_product(
    state: &AppState,
    category_id: &str,
    title: &str,
    price: &str,
    stock: i64,
) -> String {
    let product = state
        .catalog()
        .create_product(ProductCreate {
            title: title.to_string(),
            description: String::new(),
            price: dec(price),
            stock: Some(stock),
            unit: None,
            images: Vec::new(),
            attributes: None,
            category_id: category_id.to_string(),
        })
        .await
        .expect("seed product");
    product.id.expect("product id").to_string()
}

/// Current stock of a product
pub async fn stock_of(state: &AppState, product_id: &str) -> i64 {
    state
        .catalog()
        .get_product(product_id)
        .await
        .expect("product exists")
        .stock
}
