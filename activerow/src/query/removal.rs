use super::{Assignment, DeleteBuilder, Dialect, Filter, QueryError, Statement, UpdateBuilder, WhereClause};
use crate::schema::SchemaIdentifier;

/// The statement a removal renders: a hard DELETE, or an UPDATE that flags
/// rows when the model carries delete assignments.
///
/// Predicates and `returning` apply to either kind. Anything specific to one
/// kind goes through [`map_delete`](Self::map_delete) or
/// [`map_update`](Self::map_update):
///
/// ```ignore
/// Todo::delete_where(&db, |q| {
///     q.where_eq("value", "foo")
///         .map_update(|u| u.set("value", "archived"))
/// })
/// ```
#[derive(Debug, Clone)]
pub enum RemovalBuilder {
    Delete(DeleteBuilder),
    Update(UpdateBuilder),
}

impl RemovalBuilder {
    /// DELETE when `assignments` is empty, otherwise an UPDATE setting them.
    pub fn new<'a, I>(table: SchemaIdentifier, assignments: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Assignment)>,
    {
        let mut assignments = assignments.into_iter().peekable();
        if assignments.peek().is_none() {
            return RemovalBuilder::Delete(DeleteBuilder::new(table));
        }
        let update = assignments.fold(UpdateBuilder::new(table), |q, (column, assignment)| {
            q.set_assignment(column, assignment)
        });
        RemovalBuilder::Update(update)
    }

    /// True when the removal flags rows instead of deleting them.
    pub fn is_update(&self) -> bool {
        matches!(self, RemovalBuilder::Update(_))
    }

    pub fn returning(self, column: &str) -> Self {
        match self {
            RemovalBuilder::Delete(q) => RemovalBuilder::Delete(q.returning(column)),
            RemovalBuilder::Update(q) => RemovalBuilder::Update(q.returning(column)),
        }
    }

    /// Refine a hard DELETE; a flagging UPDATE passes through unchanged.
    pub fn map_delete<F>(self, f: F) -> Self
    where
        F: FnOnce(DeleteBuilder) -> DeleteBuilder,
    {
        match self {
            RemovalBuilder::Delete(q) => RemovalBuilder::Delete(f(q)),
            other => other,
        }
    }

    /// Refine a flagging UPDATE, e.g. with extra `SET` pairs; a hard DELETE
    /// passes through unchanged.
    pub fn map_update<F>(self, f: F) -> Self
    where
        F: FnOnce(UpdateBuilder) -> UpdateBuilder,
    {
        match self {
            RemovalBuilder::Update(q) => RemovalBuilder::Update(f(q)),
            other => other,
        }
    }

    pub fn build(&self, dialect: Dialect) -> Result<Statement, QueryError> {
        match self {
            RemovalBuilder::Delete(q) => q.build(dialect),
            RemovalBuilder::Update(q) => q.build(dialect),
        }
    }
}

impl Filter for RemovalBuilder {
    fn where_clause_mut(&mut self) -> &mut WhereClause {
        match self {
            RemovalBuilder::Delete(q) => q.where_clause_mut(),
            RemovalBuilder::Update(q) => q.where_clause_mut(),
        }
    }
}
