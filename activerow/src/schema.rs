use crate::query::{quote_segment, validate_segment, Dialect, QueryError};

/// A table name, optionally qualified by a schema (namespace).
///
/// Renders as `"schema"."table"` or `"table"` depending on whether a
/// non-blank schema is set.
///
/// # Example
///
/// ```ignore
/// impl Model for Invoice {
///     fn schema() -> SchemaIdentifier {
///         SchemaIdentifier::new("invoices").with_schema("billing")
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaIdentifier {
    table: String,
    schema: Option<String>,
}

impl SchemaIdentifier {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.schema = if schema.trim().is_empty() {
            None
        } else {
            Some(schema)
        };
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Quote the identifier for `dialect`, rejecting names that are not plain
    /// SQL identifiers.
    pub fn render(&self, dialect: Dialect) -> Result<String, QueryError> {
        validate_segment(&self.table, "table")?;
        let table = quote_segment(&self.table, dialect);
        match &self.schema {
            Some(schema) => {
                validate_segment(schema, "schema")?;
                Ok(format!("{}.{table}", quote_segment(schema, dialect)))
            }
            None => Ok(table),
        }
    }
}

impl From<&str> for SchemaIdentifier {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

impl From<String> for SchemaIdentifier {
    fn from(table: String) -> Self {
        Self::new(table)
    }
}

impl std::fmt::Display for SchemaIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "\"{schema}\".")?;
        }
        write!(f, "\"{}\"", self.table)
    }
}
