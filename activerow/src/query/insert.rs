use serde::Serialize;

use super::{Dialect, QueryError, SqlWriter, Statement};
use crate::error::DataError;
use crate::mapping::RowEncoder;
use crate::schema::SchemaIdentifier;
use crate::value::Value;

/// Conflict resolution for INSERT (upsert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnConflict {
    /// `ON CONFLICT (target) DO NOTHING`; an empty target matches any constraint.
    DoNothing { target: Vec<String> },
    /// `ON CONFLICT (target) DO UPDATE SET col = excluded.col, ...`.
    ///
    /// If `columns` is empty, every inserted column outside the target is
    /// updated.
    DoUpdate {
        target: Vec<String>,
        columns: Vec<String>,
    },
}

/// INSERT builder for one or many rows.
///
/// # Example
///
/// ```ignore
/// let stmt = InsertBuilder::new(Todo::schema())
///     .model(&todo, RowEncoder::for_writes())?
///     .on_conflict_do_update(&["unique_value"], &["value"])
///     .returning("id")
///     .build(Dialect::Sqlite)?;
/// ```
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: SchemaIdentifier,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    on_conflict: Option<OnConflict>,
    returning: Vec<String>,
}

impl InsertBuilder {
    pub fn new(table: SchemaIdentifier) -> Self {
        Self {
            table,
            columns: Vec::new(),
            rows: Vec::new(),
            on_conflict: None,
            returning: Vec::new(),
        }
    }

    /// Append a row of explicit `(column, value)` pairs.
    ///
    /// Columns unseen so far are added, and earlier rows get `NULL` for them.
    pub fn values(mut self, pairs: Vec<(String, Value)>) -> Self {
        self.push_row(pairs);
        self
    }

    /// Append one row encoded from `model`.
    pub fn model<T: Serialize>(mut self, model: &T, encoder: RowEncoder) -> Result<Self, DataError> {
        let pairs = encoder.encode(model)?;
        self.push_row(pairs);
        Ok(self)
    }

    /// Append one row per model, in order.
    pub fn models<T: Serialize>(mut self, models: &[T], encoder: RowEncoder) -> Result<Self, DataError> {
        for model in models {
            let pairs = encoder.encode(model)?;
            self.push_row(pairs);
        }
        Ok(self)
    }

    pub fn on_conflict_do_nothing(mut self, target: &[&str]) -> Self {
        self.on_conflict = Some(OnConflict::DoNothing {
            target: to_owned(target),
        });
        self
    }

    pub fn on_conflict_do_update(mut self, target: &[&str], columns: &[&str]) -> Self {
        self.on_conflict = Some(OnConflict::DoUpdate {
            target: to_owned(target),
            columns: to_owned(columns),
        });
        self
    }

    pub fn returning(mut self, column: &str) -> Self {
        self.returning.push(column.to_string());
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn push_row(&mut self, pairs: Vec<(String, Value)>) {
        let mut row = vec![Value::Null; self.columns.len()];
        for (column, value) in pairs {
            match self.columns.iter().position(|c| *c == column) {
                Some(idx) => row[idx] = value,
                None => {
                    self.columns.push(column);
                    for existing in &mut self.rows {
                        existing.push(Value::Null);
                    }
                    row.push(value);
                }
            }
        }
        self.rows.push(row);
    }

    pub fn build(&self, dialect: Dialect) -> Result<Statement, QueryError> {
        if self.rows.is_empty() {
            return Err(QueryError::EmptyInsert);
        }
        let mut w = SqlWriter::new(dialect);
        let ignore = dialect == Dialect::MySql
            && matches!(self.on_conflict, Some(OnConflict::DoNothing { .. }));
        w.push(if ignore { "INSERT IGNORE INTO " } else { "INSERT INTO " });
        w.push(&self.table.render(dialect)?);

        if self.columns.is_empty() {
            w.push(" DEFAULT VALUES");
        } else {
            w.push(" (");
            w.column_list(&self.columns)?;
            w.push(") VALUES ");
            for (r, row) in self.rows.iter().enumerate() {
                if r > 0 {
                    w.push(", ");
                }
                w.push("(");
                for (i, value) in row.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    w.bind(value.clone());
                }
                w.push(")");
            }
        }

        if let Some(conflict) = &self.on_conflict {
            self.render_conflict(conflict, &mut w)?;
        }
        w.returning(&self.returning)?;
        Ok(w.finish())
    }

    fn render_conflict(&self, conflict: &OnConflict, w: &mut SqlWriter) -> Result<(), QueryError> {
        match conflict {
            OnConflict::DoNothing { .. } if w.dialect() == Dialect::MySql => Ok(()),
            OnConflict::DoNothing { target } => {
                w.push(" ON CONFLICT");
                if !target.is_empty() {
                    w.push(" (");
                    w.column_list(target)?;
                    w.push(")");
                }
                w.push(" DO NOTHING");
                Ok(())
            }
            OnConflict::DoUpdate { target, columns } => {
                let updated: Vec<&String> = if columns.is_empty() {
                    self.columns.iter().filter(|c| !target.contains(*c)).collect()
                } else {
                    columns.iter().collect()
                };
                if updated.is_empty() {
                    return Err(QueryError::EmptyAssignments);
                }
                if w.dialect() == Dialect::MySql {
                    w.push(" ON DUPLICATE KEY UPDATE ");
                    for (i, col) in updated.iter().enumerate() {
                        if i > 0 {
                            w.push(", ");
                        }
                        w.column(col)?;
                        w.push(" = VALUES(");
                        w.column(col)?;
                        w.push(")");
                    }
                    return Ok(());
                }
                if target.is_empty() {
                    return Err(QueryError::MissingConflictTarget);
                }
                w.push(" ON CONFLICT (");
                w.column_list(target)?;
                w.push(") DO UPDATE SET ");
                for (i, col) in updated.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    w.column(col)?;
                    w.push(" = excluded.");
                    w.column(col)?;
                }
                Ok(())
            }
        }
    }
}

fn to_owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}
