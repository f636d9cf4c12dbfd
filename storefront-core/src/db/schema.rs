//! Startup Schema
//!
//! Idempotent index definitions applied on every connection.
//!
//! 唯一索引承担两类不变量：slug 全局唯一、(cart, product) 与
//! (user, product) 组合行唯一。购物车本身的 user 唯一性由
//! find-or-create 事务保证（可选字段不入唯一索引）。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const STATEMENTS: &[&str] = &[
    "DEFINE INDEX IF NOT EXISTS uniq_category_slug ON TABLE category FIELDS slug UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_product_slug ON TABLE product FIELDS slug UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_cart_item_line ON TABLE cart_item FIELDS cart_id, product_id UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_wishlist_entry ON TABLE wishlist FIELDS user_id, product_id UNIQUE",
    "DEFINE INDEX IF NOT EXISTS idx_product_category ON TABLE product FIELDS category_id",
    "DEFINE INDEX IF NOT EXISTS idx_order_user ON TABLE order FIELDS user_id",
];

/// Apply all schema statements; safe to run repeatedly
pub async fn apply(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    for stmt in STATEMENTS {
        db.query(*stmt).await?.check()?;
    }
    Ok(())
}
