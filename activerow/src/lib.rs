//! # activerow: active-record persistence over a SQL builder
//!
//! Any serde-serializable struct becomes a persisted record by implementing
//! [`Model`]. The record layer synthesizes statements from the struct's
//! fields (snake_case column names, explicit NULLs) and hands them to a
//! [`Database`] executor; the `activerow-sqlx` crate provides one backed by
//! SQLx.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Model`] | Table, id accessors and lifecycle overlays of a record type |
//! | [`Crud`] | `all` / `first` / `count`, `insert` / `update` / `delete`, bulk `update_where` / `delete_where` |
//! | [`Batch`] | `insert_all` / `delete_all` on slices of models |
//! | [`Timestamped`], [`SoftDeletable`] | Capabilities enabled through [`Model::Lifecycle`] |
//! | [`query`] | SELECT / INSERT / UPDATE / DELETE builders and the [`Filter`] predicates |
//! | [`mapping`] | Key casing and null encoding between models and rows |
//! | [`DataError`] | Error type of every operation |

pub mod batch;
pub mod crud;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod mapping;
pub mod model;
pub mod query;
pub mod schema;
pub mod value;

#[cfg(test)]
mod testing;

pub use batch::Batch;
pub use crud::Crud;
pub use database::{Database, Row};
pub use error::{DataError, DataResult};
pub use lifecycle::{Lifecycle, Plain, SoftDeletable, SoftDeletes, Timestamped, Timestamps};
pub use model::Model;
pub use query::{Dialect, Filter, Statement};
pub use schema::SchemaIdentifier;
pub use value::Value;

pub mod prelude {
    //! Re-exports of the most commonly used record types.
    pub use crate::query::{
        DeleteBuilder, InsertBuilder, RemovalBuilder, SelectBuilder, UpdateBuilder, WhereClause,
    };
    pub use crate::{
        Batch, Crud, DataError, Database, Filter, Model, Plain, SchemaIdentifier, SoftDeletable,
        SoftDeletes, Timestamped, Timestamps,
    };
}
