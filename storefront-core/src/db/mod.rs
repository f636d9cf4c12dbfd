//! Database Module
//!
//! Handles the embedded SurrealDB connection and startup schema.

pub mod models;
pub mod repository;
mod schema;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "main";

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    db: Surreal<Db>,
}

impl std::fmt::Debug for DbService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbService").finish()
    }
}

impl DbService {
    /// Open (or create) an on-disk database at `path` and apply the schema
    pub async fn open(path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// Open an isolated in-memory database (tests, ephemeral tooling)
    pub async fn memory() -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        schema::apply(&db)
            .await
            .map_err(|e| AppError::Database(format!("Failed to apply schema: {e}")))?;

        tracing::info!("Database connection established (embedded SurrealDB)");
        Ok(Self { db })
    }

    /// Clone of the underlying handle, for constructing repositories
    pub fn handle(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
