use std::future::Future;

use chrono::Utc;

use crate::database::{Database, Row};
use crate::error::DataError;
use crate::lifecycle::{Assignments, Lifecycle};
use crate::mapping::{RowDecoder, RowEncoder};
use crate::model::Model;
use crate::query::{Dialect, Filter, InsertBuilder, RemovalBuilder, SelectBuilder, Statement, UpdateBuilder};
use crate::schema::SchemaIdentifier;
use crate::value::Value;

/// CRUD operations available on every [`Model`].
///
/// Type-level operations (`all`, `first`, `count`, `update_where`,
/// `delete_where`) take a modifier that refines the statement before it is
/// rendered. Instance operations (`insert`, `update`, `delete`) encode the
/// entity itself and run the model's [`Lifecycle`] hooks.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait`.
///
/// # Example
///
/// ```ignore
/// let mut todo = Todo::new("foo");
/// todo.insert(&db).await?;
///
/// let ids = Todo::update_where(&db, |q| q.set("value", "bar").where_eq("value", "foo")).await?;
/// let bars = Todo::all_with(&db, |q| q.where_eq("value", "bar")).await?;
/// ```
pub trait Crud: Model {
    /// Every row of the table.
    fn all<D: Database>(db: &D) -> impl Future<Output = Result<Vec<Self>, DataError>> + Send {
        Self::all_with(db, |q| q)
    }

    fn all_with<D, F>(db: &D, modifier: F) -> impl Future<Output = Result<Vec<Self>, DataError>> + Send
    where
        D: Database,
        F: FnOnce(SelectBuilder) -> SelectBuilder,
    {
        let statement = modifier(SelectBuilder::new(Self::schema())).build(db.dialect());
        async move {
            let rows = fetch(db, "select", Self::schema(), statement?).await?;
            RowDecoder::for_reads().decode_all(&rows)
        }
    }

    /// The first row, if any.
    fn first<D: Database>(db: &D) -> impl Future<Output = Result<Option<Self>, DataError>> + Send {
        Self::first_with(db, |q| q)
    }

    /// The first row matching the modifier. Any limit it sets is replaced by 1.
    fn first_with<D, F>(db: &D, modifier: F) -> impl Future<Output = Result<Option<Self>, DataError>> + Send
    where
        D: Database,
        F: FnOnce(SelectBuilder) -> SelectBuilder,
    {
        let statement = modifier(SelectBuilder::new(Self::schema()))
            .limit(1)
            .build(db.dialect());
        async move {
            match fetch(db, "select", Self::schema(), statement?).await?.first() {
                Some(row) => RowDecoder::for_reads().decode(row).map(Some),
                None => Ok(None),
            }
        }
    }

    fn count<D: Database>(db: &D) -> impl Future<Output = Result<u64, DataError>> + Send {
        Self::count_with(db, |q| q)
    }

    fn count_with<D, F>(db: &D, modifier: F) -> impl Future<Output = Result<u64, DataError>> + Send
    where
        D: Database,
        F: FnOnce(SelectBuilder) -> SelectBuilder,
    {
        let statement = modifier(SelectBuilder::count(Self::schema())).build(db.dialect());
        async move {
            let rows = fetch(db, "count", Self::schema(), statement?).await?;
            match rows.first().and_then(|row| row.value_at(0)) {
                None | Some(Value::Null) => Ok(0),
                Some(Value::Int(n)) => u64::try_from(*n)
                    .map_err(|_| DataError::Decode(format!("negative row count {n}"))),
                Some(other) => Err(DataError::Decode(format!("row count is not an integer: {other:?}"))),
            }
        }
    }

    /// Insert the entity and adopt the id the database reports.
    fn insert<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<(), DataError>> + Send {
        self.insert_with(db, |q| q)
    }

    /// Insert with a modifier, e.g. to add an `ON CONFLICT` clause.
    ///
    /// When the statement yields no row (a conflict resolved with
    /// `DO NOTHING`), the id is cleared.
    fn insert_with<D, F>(&mut self, db: &D, modifier: F) -> impl Future<Output = Result<(), DataError>> + Send
    where
        D: Database,
        F: FnOnce(InsertBuilder) -> InsertBuilder,
    {
        <Self::Lifecycle as Lifecycle<Self>>::on_insert(self, Utc::now());
        let statement = InsertBuilder::new(Self::schema())
            .model(&*self, RowEncoder::for_writes())
            .and_then(|q| {
                modifier(q)
                    .returning(Self::id_column())
                    .build(db.dialect())
                    .map_err(DataError::from)
            });
        async move {
            let rows = fetch(db, "insert", Self::schema(), statement?).await?;
            let id = match rows.first() {
                Some(row) => Some(row.decode_column::<Self::Id>(Self::id_column())?),
                None => {
                    let table = Self::schema();
                    tracing::warn!(table = %table, "insert returned no row, clearing id");
                    None
                }
            };
            self.set_id(id);
            Ok(())
        }
    }

    /// Write every field of the entity to its row.
    ///
    /// Fails with [`DataError::IdRequired`] before touching the entity if it
    /// has no id.
    fn update<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<(), DataError>> + Send {
        let statement = update_statement(self, db.dialect());
        async move {
            execute(db, "update", Self::schema(), statement?).await?;
            Ok(())
        }
    }

    /// Predicate-driven update; returns the ids of the affected rows.
    ///
    /// The model's update assignments (e.g. `updated_at`) are set first, so
    /// the modifier may override them. Entities already in memory are not
    /// touched.
    fn update_where<D, F>(db: &D, modifier: F) -> impl Future<Output = Result<Vec<Self::Id>, DataError>> + Send
    where
        D: Database,
        F: FnOnce(UpdateBuilder) -> UpdateBuilder,
    {
        let assignments = <Self::Lifecycle as Lifecycle<Self>>::update_assignments(Utc::now());
        let builder = assign(UpdateBuilder::new(Self::schema()), assignments);
        let statement = modifier(builder)
            .returning(Self::id_column())
            .build(db.dialect());
        async move {
            let rows = fetch(db, "update", Self::schema(), statement?).await?;
            decode_ids::<Self>(&rows)
        }
    }

    /// Delete the entity's row, or flag it for soft-deletable models.
    ///
    /// Fails with [`DataError::IdRequired`] before touching the entity if it
    /// has no id.
    fn delete<D: Database>(&mut self, db: &D) -> impl Future<Output = Result<(), DataError>> + Send {
        let statement = delete_statement(self, db.dialect());
        async move {
            execute(db, "delete", Self::schema(), statement?).await?;
            Ok(())
        }
    }

    /// Predicate-driven delete; returns the ids of the affected rows.
    ///
    /// Soft-deletable models get an UPDATE seeded with the flagging
    /// assignments, which the modifier may extend through
    /// [`RemovalBuilder::map_update`].
    fn delete_where<D, F>(db: &D, modifier: F) -> impl Future<Output = Result<Vec<Self::Id>, DataError>> + Send
    where
        D: Database,
        F: FnOnce(RemovalBuilder) -> RemovalBuilder,
    {
        let assignments = <Self::Lifecycle as Lifecycle<Self>>::delete_assignments(Utc::now());
        let statement = modifier(removal::<Self>(assignments))
            .returning(Self::id_column())
            .build(db.dialect());
        async move {
            let rows = fetch(db, "delete", Self::schema(), statement?).await?;
            decode_ids::<Self>(&rows)
        }
    }
}

impl<M: Model> Crud for M {}

fn update_statement<M: Model>(entity: &mut M, dialect: Dialect) -> Result<Statement, DataError> {
    let id = Value::from_serialize(entity.require_id()?)?;
    <M::Lifecycle as Lifecycle<M>>::on_update(entity, Utc::now());
    let statement = UpdateBuilder::new(M::schema())
        .set_model(&*entity, RowEncoder::for_writes())?
        .where_eq(M::id_column(), id)
        .build(dialect)?;
    Ok(statement)
}

fn delete_statement<M: Model>(entity: &mut M, dialect: Dialect) -> Result<Statement, DataError> {
    let id = Value::from_serialize(entity.require_id()?)?;
    let now = Utc::now();
    <M::Lifecycle as Lifecycle<M>>::on_delete(entity, now);
    let assignments = <M::Lifecycle as Lifecycle<M>>::entity_delete_assignments(entity, now);
    let statement = removal::<M>(assignments)
        .where_eq(M::id_column(), id)
        .build(dialect)?;
    Ok(statement)
}

/// DELETE, or UPDATE with `assignments` when there are any.
pub(crate) fn removal<M: Model>(assignments: Assignments) -> RemovalBuilder {
    RemovalBuilder::new(M::schema(), assignments)
}

fn assign(builder: UpdateBuilder, assignments: Assignments) -> UpdateBuilder {
    assignments
        .into_iter()
        .fold(builder, |q, (column, assignment)| q.set_assignment(column, assignment))
}

pub(crate) fn decode_ids<M: Model>(rows: &[Row]) -> Result<Vec<M::Id>, DataError> {
    rows.iter()
        .map(|row| row.decode_column::<M::Id>(M::id_column()))
        .collect()
}

pub(crate) async fn fetch<D: Database>(
    db: &D,
    op: &'static str,
    table: SchemaIdentifier,
    statement: Statement,
) -> Result<Vec<Row>, DataError> {
    tracing::debug!(op, table = %table, sql = %statement.sql, params = ?statement.params, "executing statement");
    let rows = db.fetch_all(statement).await?;
    tracing::trace!(op, rows = rows.len(), "statement returned");
    Ok(rows)
}

pub(crate) async fn execute<D: Database>(
    db: &D,
    op: &'static str,
    table: SchemaIdentifier,
    statement: Statement,
) -> Result<u64, DataError> {
    tracing::debug!(op, table = %table, sql = %statement.sql, params = ?statement.params, "executing statement");
    let affected = db.execute(statement).await?;
    tracing::trace!(op, affected, "statement executed");
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{Plain, SoftDeletable, SoftDeletes, Timestamped, Timestamps};
    use crate::query::QueryError;
    use crate::testing::{id_row, RecordingDb};
    use chrono::{DateTime, TimeZone};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Todo {
        id: Option<i64>,
        value: String,
        unique_value: String,
    }

    impl Model for Todo {
        type Id = i64;
        type Lifecycle = Plain;

        fn schema() -> SchemaIdentifier {
            "todos".into()
        }

        fn id(&self) -> Option<&i64> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ledger {
        id: Option<i64>,
        value: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        is_deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl Model for Ledger {
        type Id = i64;
        type Lifecycle = (Timestamps, SoftDeletes);

        fn schema() -> SchemaIdentifier {
            SchemaIdentifier::new("ledgers").with_schema("audit")
        }

        fn id(&self) -> Option<&i64> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: Option<i64>) {
            self.id = id;
        }
    }

    impl Timestamped for Ledger {
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn set_created_at(&mut self, at: DateTime<Utc>) {
            self.created_at = at;
        }
        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }
        fn set_updated_at(&mut self, at: DateTime<Utc>) {
            self.updated_at = at;
        }
    }

    impl SoftDeletable for Ledger {
        fn is_deleted(&self) -> bool {
            self.is_deleted
        }
        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.deleted_at
        }
        fn set_deletion(&mut self, is_deleted: bool, deleted_at: Option<DateTime<Utc>>) {
            self.is_deleted = is_deleted;
            self.deleted_at = deleted_at;
        }
    }

    fn todo(value: &str) -> Todo {
        Todo {
            id: None,
            value: value.into(),
            unique_value: format!("u-{value}"),
        }
    }

    fn ledger() -> Ledger {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        Ledger {
            id: None,
            value: "entry".into(),
            created_at: epoch,
            updated_at: epoch,
            is_deleted: false,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_adopts_returned_id() {
        let db = RecordingDb::new(Dialect::Sqlite);
        db.respond(vec![id_row(7)]);
        let mut t = todo("foo");
        t.insert(&db).await.unwrap();

        assert_eq!(t.id, Some(7));
        let stmt = db.last();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"todos\" (\"id\", \"value\", \"unique_value\") VALUES (?, ?, ?) RETURNING \"id\""
        );
        assert_eq!(stmt.params[0], Value::Null);
    }

    #[tokio::test]
    async fn test_insert_without_returned_row_clears_id() {
        let db = RecordingDb::new(Dialect::Sqlite);
        let mut t = todo("foo");
        t.id = Some(3);
        t.insert_with(&db, |q| q.on_conflict_do_nothing(&["unique_value"]))
            .await
            .unwrap();
        assert_eq!(t.id, None);
        assert!(db.last().sql.contains("ON CONFLICT (\"unique_value\") DO NOTHING RETURNING"));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_id() {
        let db = RecordingDb::new(Dialect::Sqlite);
        let mut t = todo("foo");
        assert!(t.update(&db).await.unwrap_err().is_id_required());
        assert!(t.delete(&db).await.unwrap_err().is_id_required());

        let mut l = ledger();
        assert!(l.delete(&db).await.unwrap_err().is_id_required());
        assert!(!l.is_deleted);
        assert!(l.update(&db).await.unwrap_err().is_id_required());
        assert_eq!(l.updated_at, Utc.timestamp_opt(0, 0).unwrap());
        assert!(db.statements().is_empty());
    }

    #[tokio::test]
    async fn test_update_writes_all_fields_by_id() {
        let db = RecordingDb::new(Dialect::Postgres);
        let mut t = todo("foo");
        t.id = Some(2);
        t.update(&db).await.unwrap();
        let stmt = db.last();
        assert_eq!(
            stmt.sql,
            "UPDATE \"todos\" SET \"id\" = $1, \"value\" = $2, \"unique_value\" = $3 WHERE \"id\" = $4"
        );
        assert_eq!(stmt.params[3], Value::Int(2));
    }

    #[tokio::test]
    async fn test_plain_delete_removes_row() {
        let db = RecordingDb::new(Dialect::Sqlite);
        let mut t = todo("foo");
        t.id = Some(4);
        t.delete(&db).await.unwrap();
        assert_eq!(db.last().sql, "DELETE FROM \"todos\" WHERE \"id\" = ?");
    }

    #[tokio::test]
    async fn test_queries() {
        let db = RecordingDb::new(Dialect::Sqlite);
        db.respond(vec![
            Row::new(vec![
                ("id".into(), Value::Int(1)),
                ("value".into(), Value::from("bar")),
                ("unique_value".into(), Value::from("u1")),
            ]),
        ]);
        let all = Todo::all_with(&db, |q| q.where_eq("value", "bar")).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].unique_value, "u1");
        assert_eq!(db.last().sql, "SELECT * FROM \"todos\" WHERE \"value\" = ?");

        assert!(Todo::first(&db).await.unwrap().is_none());
        assert_eq!(db.last().sql, "SELECT * FROM \"todos\" LIMIT 1");

        db.respond(vec![Row::new(vec![("count".into(), Value::Int(2))])]);
        let n = Todo::count_with(&db, |q| q.where_eq("value", "foo")).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            db.last().sql,
            "SELECT COUNT(*) FROM \"todos\" WHERE \"value\" = ?"
        );
    }

    #[tokio::test]
    async fn test_update_where_returns_ids() {
        let db = RecordingDb::new(Dialect::Sqlite);
        db.respond(vec![id_row(1), id_row(3)]);
        let ids = Todo::update_where(&db, |q| q.set("value", "bar").where_eq("value", "foo"))
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            db.last().sql,
            "UPDATE \"todos\" SET \"value\" = ? WHERE \"value\" = ? RETURNING \"id\""
        );
    }

    #[tokio::test]
    async fn test_plain_update_where_without_assignments_fails() {
        let db = RecordingDb::new(Dialect::Sqlite);
        let err = Todo::update_where(&db, |q| q.where_eq("value", "foo"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Query(QueryError::EmptyAssignments)));
        assert!(db.statements().is_empty());
    }

    #[tokio::test]
    async fn test_timestamped_update_where_stamps_updated_at() {
        let db = RecordingDb::new(Dialect::Sqlite);
        Ledger::update_where(&db, |q| q.set("value", "x")).await.unwrap();
        let stmt = db.last();
        assert_eq!(
            stmt.sql,
            "UPDATE \"audit\".\"ledgers\" SET \"updated_at\" = ?, \"value\" = ? RETURNING \"id\""
        );
        assert!(matches!(stmt.params[0], Value::Timestamp(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_flags_row() {
        let db = RecordingDb::new(Dialect::Sqlite);
        let mut l = ledger();
        l.id = Some(9);
        l.delete(&db).await.unwrap();

        assert!(l.is_deleted);
        let stamped = l.deleted_at.unwrap();
        let stmt = db.last();
        assert_eq!(
            stmt.sql,
            "UPDATE \"audit\".\"ledgers\" SET \"is_deleted\" = ?, \"deleted_at\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(
            stmt.params,
            vec![Value::Bool(true), Value::Timestamp(stamped), Value::Int(9)]
        );
    }

    #[tokio::test]
    async fn test_delete_where_by_capability() {
        let db = RecordingDb::new(Dialect::Sqlite);
        db.respond(vec![id_row(5)]);
        let ids = Todo::delete_where(&db, |q| q.where_eq("value", "foo")).await.unwrap();
        assert_eq!(ids, vec![5]);
        assert_eq!(
            db.last().sql,
            "DELETE FROM \"todos\" WHERE \"value\" = ? RETURNING \"id\""
        );

        Ledger::delete_where(&db, |q| q.where_eq("value", "foo")).await.unwrap();
        assert_eq!(
            db.last().sql,
            "UPDATE \"audit\".\"ledgers\" SET \"is_deleted\" = ?, \"deleted_at\" = COALESCE(\"deleted_at\", ?) WHERE \"value\" = ? RETURNING \"id\""
        );
    }

    #[tokio::test]
    async fn test_delete_where_extra_assignments() {
        let db = RecordingDb::new(Dialect::Sqlite);
        Ledger::delete_where(&db, |q| {
            q.where_eq("value", "foo").map_update(|u| u.set("value", "void"))
        })
        .await
        .unwrap();
        let stmt = db.last();
        assert_eq!(
            stmt.sql,
            "UPDATE \"audit\".\"ledgers\" SET \"is_deleted\" = ?, \"deleted_at\" = COALESCE(\"deleted_at\", ?), \"value\" = ? WHERE \"value\" = ? RETURNING \"id\""
        );
        assert_eq!(stmt.params[2], Value::from("void"));

        Todo::delete_where(&db, |q| {
            q.where_eq("value", "foo").map_update(|u| u.set("value", "void"))
        })
        .await
        .unwrap();
        assert_eq!(
            db.last().sql,
            "DELETE FROM \"todos\" WHERE \"value\" = ? RETURNING \"id\""
        );
    }
}
