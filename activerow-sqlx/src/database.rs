use sqlx::pool::PoolOptions;
use sqlx::{Database, Pool};

use crate::config::DatabaseConfig;
use crate::error::{SqlxErrorExt, SqlxResult};

/// An [`activerow::Database`] executor backed by an `sqlx::Pool<DB>`.
///
/// The pool is cheap to clone, and so is this wrapper.
///
/// # Example
///
/// ```ignore
/// let db = SqlxDatabase::<Sqlite>::new(pool.clone());
/// let todos = Todo::all(&db).await?;
/// ```
pub struct SqlxDatabase<DB: Database> {
    pool: Pool<DB>,
}

impl<DB: Database> SqlxDatabase<DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self { pool }
    }

    /// Open a pool with sqlx's default options.
    ///
    /// Every pooled connection to `sqlite::memory:` gets its own empty
    /// database; build the pool yourself with a single connection and use
    /// [`new`](Self::new) for that case.
    pub async fn connect(config: &DatabaseConfig) -> SqlxResult<Self> {
        let pool = PoolOptions::<DB>::new()
            .connect(&config.url)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        tracing::debug!("database pool opened");
        Ok(Self::new(pool))
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<DB: Database> Clone for SqlxDatabase<DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}
