//! # activerow-sqlx: SQLx executor for activerow
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-backed
//! implementation of [`activerow::Database`]. It depends on [`activerow`] for
//! the record layer and adds the pool wrapper, value binding, row conversion
//! and error bridging needed to talk to a real database.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxDatabase`] | Executor holding an `sqlx::Pool<DB>` |
//! | [`DatabaseConfig`] | Connection URL, deserializable or read from `DATABASE_URL` |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Feature flags
//!
//! | Feature  | Driver |
//! |----------|--------|
//! | `sqlite` | SQLite via `sqlx/sqlite` (default) |
//!
//! # Quick start
//!
//! ```ignore
//! use activerow_sqlx::prelude::*;
//! use sqlx::Sqlite;
//!
//! let db = SqlxDatabase::<Sqlite>::connect(&DatabaseConfig::from_env()?).await?;
//!
//! let mut todo = Todo { id: None, value: "foo".into() };
//! todo.insert(&db).await?;
//! let ids = Todo::update_where(&db, |q| q.set("value", "bar").where_eq("value", "foo")).await?;
//! ```
//!
//! # Error bridging
//!
//! Driver failures reach callers untouched inside `DataError::Database`.
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use activerow_sqlx::SqlxErrorExt;
//!
//! sqlx::query("CREATE TABLE todos (id INTEGER PRIMARY KEY, value TEXT)")
//!     .execute(db.pool())
//!     .await
//!     .map_err(|e| e.into_data_error())?;
//! ```

pub mod config;
pub mod database;
pub mod error;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{ConfigError, DatabaseConfig};
pub use database::SqlxDatabase;
pub use error::{SqlxErrorExt, SqlxResult};

/// Re-exports of the most commonly used types from both `activerow` and this crate.
pub mod prelude {
    pub use crate::{DatabaseConfig, SqlxDatabase, SqlxErrorExt};
    pub use activerow::prelude::*;
}
