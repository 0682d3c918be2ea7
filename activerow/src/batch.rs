use std::future::Future;

use chrono::Utc;

use crate::crud::{decode_ids, fetch, removal};
use crate::database::Database;
use crate::error::DataError;
use crate::lifecycle::Lifecycle;
use crate::mapping::RowEncoder;
use crate::model::Model;
use crate::query::{Dialect, Filter, InsertBuilder, Statement};
use crate::value::Value;

/// Operations over a collection of models, each executed as one statement.
///
/// Implemented for `[M]`, so it is available on slices and `Vec`s. An empty
/// collection returns an empty id list without touching the database.
///
/// ```ignore
/// let mut todos = vec![Todo::new("foo"), Todo::new("bar")];
/// let ids = todos.insert_all(&db).await?;
/// ```
pub trait Batch<M: Model> {
    /// Insert every element in a single multi-row INSERT and return the
    /// generated ids in row order.
    ///
    /// Ids are not written back onto the elements.
    fn insert_all<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<Vec<M::Id>, DataError>> + Send;

    fn insert_all_with<D, F>(
        &mut self,
        db: &D,
        modifier: F,
    ) -> impl Future<Output = Result<Vec<M::Id>, DataError>> + Send
    where
        D: Database,
        F: FnOnce(InsertBuilder) -> InsertBuilder;

    /// Delete (or, for soft-deletable models, flag) every element by id.
    ///
    /// Every element must carry an id; otherwise nothing is mutated or
    /// executed and [`DataError::IdRequired`] is returned.
    fn delete_all<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<Vec<M::Id>, DataError>> + Send;
}

impl<M: Model> Batch<M> for [M] {
    fn insert_all<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<Vec<M::Id>, DataError>> + Send {
        self.insert_all_with(db, |q| q)
    }

    fn insert_all_with<D, F>(
        &mut self,
        db: &D,
        modifier: F,
    ) -> impl Future<Output = Result<Vec<M::Id>, DataError>> + Send
    where
        D: Database,
        F: FnOnce(InsertBuilder) -> InsertBuilder,
    {
        let statement = if self.is_empty() {
            None
        } else {
            let now = Utc::now();
            for entity in self.iter_mut() {
                <M::Lifecycle as Lifecycle<M>>::on_insert(entity, now);
            }
            let built = InsertBuilder::new(M::schema())
                .models(self, RowEncoder::for_writes())
                .and_then(|q| {
                    modifier(q)
                        .returning(M::id_column())
                        .build(db.dialect())
                        .map_err(DataError::from)
                });
            Some(built)
        };
        async move {
            let Some(statement) = statement else {
                return Ok(Vec::new());
            };
            let rows = fetch(db, "insert_all", M::schema(), statement?).await?;
            decode_ids::<M>(&rows)
        }
    }

    fn delete_all<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<Vec<M::Id>, DataError>> + Send {
        let statement = if self.is_empty() {
            None
        } else {
            Some(delete_all_statement(self, db.dialect()))
        };
        async move {
            let Some(statement) = statement else {
                return Ok(Vec::new());
            };
            let rows = fetch(db, "delete_all", M::schema(), statement?).await?;
            decode_ids::<M>(&rows)
        }
    }
}

fn delete_all_statement<M: Model>(entities: &mut [M], dialect: Dialect) -> Result<Statement, DataError> {
    let ids = entities
        .iter()
        .map(|entity| entity.require_id().and_then(Value::from_serialize))
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now();
    for entity in entities.iter_mut() {
        <M::Lifecycle as Lifecycle<M>>::on_delete(entity, now);
    }
    let assignments = <M::Lifecycle as Lifecycle<M>>::delete_assignments(now);
    let statement = removal::<M>(assignments)
        .where_in(M::id_column(), ids)
        .returning(M::id_column())
        .build(dialect)?;
    Ok(statement)
}
