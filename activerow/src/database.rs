use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::DataError;
use crate::mapping::RowDecoder;
use crate::query::{Dialect, Statement};
use crate::value::Value;

/// The SQL execution engine the record layer delegates to.
///
/// Implementations own connection handling; every call executes exactly one
/// statement and reports driver failures through [`DataError::Database`].
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait`.
pub trait Database: Send + Sync {
    /// Dialect statements are rendered for.
    fn dialect(&self) -> Dialect;

    /// Execute and return every result row.
    fn fetch_all(&self, statement: Statement) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send;

    /// Execute and return the number of affected rows.
    fn execute(&self, statement: Statement) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Execute and return the first result row, if any.
    fn fetch_optional(
        &self,
        statement: Statement,
    ) -> impl Future<Output = Result<Option<Row>, DataError>> + Send {
        let rows = self.fetch_all(statement);
        async move { Ok(rows.await?.into_iter().next()) }
    }
}

/// One result row: ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, v)| v)
    }

    /// Decode a single column into `T`.
    pub fn decode_column<T: DeserializeOwned>(&self, column: &str) -> Result<T, DataError> {
        let value = self
            .get(column)
            .ok_or_else(|| DataError::Decode(format!("no column named `{column}` in row")))?;
        serde_json::from_value(value.to_json())
            .map_err(|e| DataError::Decode(format!("column `{column}`: {e}")))
    }

    /// Decode the whole row with the default read conventions.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DataError> {
        RowDecoder::for_reads().decode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup() {
        let row = Row::new(vec![
            ("id".to_string(), Value::Int(9)),
            ("value".to_string(), Value::from("foo")),
        ]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("value"), Some(&Value::from("foo")));
        assert_eq!(row.value_at(0), Some(&Value::Int(9)));
        assert_eq!(row.decode_column::<i64>("id").unwrap(), 9);
        assert!(matches!(
            row.decode_column::<i64>("missing"),
            Err(DataError::Decode(_))
        ));
    }
}
