//! Database pool and unit of work
//!
//! The unit of work is the transaction coordinator from the service
//! layer's point of view: it hands out a transaction handle and holds no
//! business logic. Dropping an uncommitted handle rolls it back.

use keystone_core::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

/// Open the connection pool and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect(&config.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Transaction coordinator
///
/// Services acquire a handle for the duration of one logical operation and
/// must release it on every exit path - `commit()` on success, or drop
/// (implicit rollback) on failure.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    pool: PgPool,
}

impl UnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction covering a group of store mutations
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// The underlying pool, for reads outside any transaction
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
