//! 后台任务管理
//!
//! 统一管理后台任务的注册、启动和关闭。目前唯一的常驻任务是过期
//! 游客购物车的定时清理。

use crate::db::repository::CartRepository;
use crate::utils::time::now_millis;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 已注册的后台任务
struct RegisteredTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// # 使用示例
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.spawn_cart_reaper(cart_repo, Duration::from_secs(3600));
///
/// // Graceful shutdown
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for BackgroundTasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTasks")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 注册一个周期任务
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // 首次 tick 立即返回，跳过以避免启动时抢跑
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => tick().await,
                }
            }
            tracing::debug!(task = name, "Background task stopped");
        });
        self.tasks.push(RegisteredTask { name, handle });
        tracing::info!(task = name, "Background task registered");
    }

    /// 注册过期游客购物车清理任务
    pub fn spawn_cart_reaper(&mut self, carts: CartRepository, period: Duration) {
        self.spawn_periodic("guest_cart_reaper", period, move || {
            let carts = carts.clone();
            async move {
                match carts.delete_expired(now_millis()).await {
                    Ok(0) => {}
                    Ok(count) => {
                        tracing::info!(count, "Reaped expired guest carts");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Guest cart reaper pass failed");
                    }
                }
            }
        });
    }

    /// 取消所有任务并等待退出
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            if let Err(e) = task.handle.await {
                tracing::warn!(task = task.name, error = %e, "Background task join failed");
            }
        }
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
