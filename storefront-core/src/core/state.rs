//! Application State
//!
//! Explicit wiring of the database and every service. There is no global
//! store handle: callers (the HTTP layer, tests, tooling) construct an
//! [`AppState`] and hand services out from it, which is what lets tests run
//! against fully isolated in-memory instances.

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::CartRepository;
use crate::services::{CartService, CatalogService, OrderService, WishlistService};
use crate::utils::AppResult;
use std::time::Duration;

/// 应用状态 - 持有所有服务的共享引用
///
/// 使用 Arc 语义的浅拷贝（内部各服务均为 Clone），所有权成本极低。
#[derive(Clone, Debug)]
pub struct AppState {
    /// 配置项 (不可变)
    pub config: Config,
    /// 嵌入式数据库
    pub db: DbService,
}

impl AppState {
    /// Open the configured on-disk database and wire all services
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = DbService::open(&config.data_dir).await?;
        Ok(Self { config, db })
    }

    /// Fully isolated in-memory instance (tests, ephemeral tooling)
    pub async fn in_memory() -> AppResult<Self> {
        let db = DbService::memory().await?;
        Ok(Self {
            config: Config::with_data_dir(":memory:"),
            db,
        })
    }

    /// Catalog service (categories, products, stock)
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.handle())
    }

    /// Cart service (guest/user carts, merge)
    pub fn carts(&self) -> CartService {
        CartService::new(self.db.handle(), self.config.guest_cart_ttl_days)
    }

    /// Order service (checkout, lifecycle)
    pub fn orders(&self) -> OrderService {
        OrderService::new(self.db.handle())
    }

    /// Wishlist service
    pub fn wishlist(&self) -> WishlistService {
        WishlistService::new(self.db.handle())
    }

    /// Register the periodic background tasks (guest-cart reaper) on `tasks`
    pub fn register_background_tasks(&self, tasks: &mut crate::core::BackgroundTasks) {
        tasks.spawn_cart_reaper(
            CartRepository::new(self.db.handle()),
            Duration::from_secs(self.config.cart_reaper_interval_secs),
        );
    }
}
