use super::{Dialect, Filter, QueryError, SqlWriter, Statement, WhereClause};
use crate::schema::SchemaIdentifier;

/// DELETE builder. Without a predicate it removes every row of the table.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: SchemaIdentifier,
    filter: WhereClause,
    returning: Vec<String>,
}

impl DeleteBuilder {
    pub fn new(table: SchemaIdentifier) -> Self {
        Self {
            table,
            filter: WhereClause::default(),
            returning: Vec::new(),
        }
    }

    pub fn returning(mut self, column: &str) -> Self {
        self.returning.push(column.to_string());
        self
    }

    pub fn build(&self, dialect: Dialect) -> Result<Statement, QueryError> {
        let mut w = SqlWriter::new(dialect);
        w.push("DELETE FROM ");
        w.push(&self.table.render(dialect)?);
        self.filter.render(&mut w)?;
        w.returning(&self.returning)?;
        Ok(w.finish())
    }
}

impl Filter for DeleteBuilder {
    fn where_clause_mut(&mut self) -> &mut WhereClause {
        &mut self.filter
    }
}
