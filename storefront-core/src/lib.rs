//! Storefront Core - 电商后端核心引擎
//!
//! # 架构概述
//!
//! 本 crate 是店面后端的领域核心，由上层 HTTP 服务调用。
//! 提供以下核心功能：
//!
//! - **商品目录** (`services::catalog`): 分类树 + 商品，库存的唯一权威来源
//! - **购物车** (`services::cart`): 游客/用户购物车，登录时合并
//! - **订单** (`services::orders`): 购物车原子转订单、价格快照、生命周期状态机
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//!
//! # 模块结构
//!
//! ```text
//! storefront-core/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── db/            # 数据库层 (模型 + 仓储)
//! ├── services/      # 业务服务
//! └── utils/         # 错误、日志、工具函数
//! ```

pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{AppState, BackgroundTasks, Config};
pub use crate::db::DbService;
pub use crate::db::models::OrderStatus;
pub use crate::services::{CartService, CatalogService, OrderService, WishlistService};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};
