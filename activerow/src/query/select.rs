use super::{Dialect, Filter, QueryError, SqlWriter, Statement, WhereClause};
use crate::schema::SchemaIdentifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    All,
    Count,
}

/// SELECT builder with a wildcard or `COUNT(*)` projection.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: SchemaIdentifier,
    projection: Projection,
    filter: WhereClause,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
}

impl SelectBuilder {
    /// `SELECT * FROM <table>`.
    pub fn new(table: SchemaIdentifier) -> Self {
        Self {
            table,
            projection: Projection::All,
            filter: WhereClause::default(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// `SELECT COUNT(*) FROM <table>`.
    pub fn count(table: SchemaIdentifier) -> Self {
        Self {
            projection: Projection::Count,
            ..Self::new(table)
        }
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    pub fn build(&self, dialect: Dialect) -> Result<Statement, QueryError> {
        let mut w = SqlWriter::new(dialect);
        match self.projection {
            Projection::All => w.push("SELECT * FROM "),
            Projection::Count => w.push("SELECT COUNT(*) FROM "),
        }
        w.push(&self.table.render(dialect)?);
        self.filter.render(&mut w)?;
        if !self.order.is_empty() {
            w.push(" ORDER BY ");
            for (idx, (col, asc)) in self.order.iter().enumerate() {
                if idx > 0 {
                    w.push(", ");
                }
                w.column(col)?;
                w.push(if *asc { " ASC" } else { " DESC" });
            }
        }
        match (self.limit_val, self.offset_val, dialect) {
            (Some(limit), _, _) => w.push(&format!(" LIMIT {limit}")),
            // OFFSET is only valid after a LIMIT outside Postgres.
            (None, Some(_), Dialect::Generic | Dialect::Sqlite) => w.push(" LIMIT -1"),
            (None, Some(_), Dialect::MySql) => w.push(&format!(" LIMIT {}", u64::MAX)),
            _ => {}
        }
        if let Some(offset) = self.offset_val {
            w.push(&format!(" OFFSET {offset}"));
        }
        Ok(w.finish())
    }
}

impl Filter for SelectBuilder {
    fn where_clause_mut(&mut self) -> &mut WhereClause {
        &mut self.filter
    }
}
