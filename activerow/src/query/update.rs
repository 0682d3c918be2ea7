use serde::Serialize;

use super::{Dialect, Filter, QueryError, SqlWriter, Statement, WhereClause};
use crate::error::DataError;
use crate::mapping::RowEncoder;
use crate::schema::SchemaIdentifier;
use crate::value::Value;

/// Right-hand side of a `SET` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `col = ?`
    Value(Value),
    /// `col = COALESCE(col, ?)`: a value already stored wins.
    IfNull(Value),
}

impl From<Value> for Assignment {
    fn from(value: Value) -> Self {
        Assignment::Value(value)
    }
}

/// UPDATE builder.
///
/// Assigning the same column twice keeps the latest value in its original
/// position.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: SchemaIdentifier,
    assignments: Vec<(String, Assignment)>,
    filter: WhereClause,
    returning: Vec<String>,
}

impl UpdateBuilder {
    pub fn new(table: SchemaIdentifier) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filter: WhereClause::default(),
            returning: Vec::new(),
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.assign(column.to_string(), Assignment::Value(value.into()));
        self
    }

    /// Set `column` only on rows where it is still NULL.
    pub fn set_if_null(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.assign(column.to_string(), Assignment::IfNull(value.into()));
        self
    }

    pub fn set_assignment(mut self, column: &str, assignment: Assignment) -> Self {
        self.assign(column.to_string(), assignment);
        self
    }

    /// Assign every encoded field of `model`.
    pub fn set_model<T: Serialize>(mut self, model: &T, encoder: RowEncoder) -> Result<Self, DataError> {
        for (column, value) in encoder.encode(model)? {
            self.assign(column, Assignment::Value(value));
        }
        Ok(self)
    }

    pub fn returning(mut self, column: &str) -> Self {
        self.returning.push(column.to_string());
        self
    }

    pub fn assignments(&self) -> &[(String, Assignment)] {
        &self.assignments
    }

    fn assign(&mut self, column: String, assignment: Assignment) {
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = assignment,
            None => self.assignments.push((column, assignment)),
        }
    }

    pub fn build(&self, dialect: Dialect) -> Result<Statement, QueryError> {
        if self.assignments.is_empty() {
            return Err(QueryError::EmptyAssignments);
        }
        let mut w = SqlWriter::new(dialect);
        w.push("UPDATE ");
        w.push(&self.table.render(dialect)?);
        w.push(" SET ");
        for (idx, (column, assignment)) in self.assignments.iter().enumerate() {
            if idx > 0 {
                w.push(", ");
            }
            w.column(column)?;
            w.push(" = ");
            match assignment {
                Assignment::Value(value) => w.bind(value.clone()),
                Assignment::IfNull(value) => {
                    w.push("COALESCE(");
                    w.column(column)?;
                    w.push(", ");
                    w.bind(value.clone());
                    w.push(")");
                }
            }
        }
        self.filter.render(&mut w)?;
        w.returning(&self.returning)?;
        Ok(w.finish())
    }
}

impl Filter for UpdateBuilder {
    fn where_clause_mut(&mut self) -> &mut WhereClause {
        &mut self.filter
    }
}
