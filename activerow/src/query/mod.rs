//! Statement builders for SELECT, INSERT, UPDATE and DELETE.
//!
//! Builders are plain owned values. Statement modifiers are closures of the
//! form `FnOnce(Builder) -> Builder`, so they compose by ordinary function
//! application:
//!
//! ```ignore
//! let q = SelectBuilder::new(Todo::schema())
//!     .where_eq("value", "foo")
//!     .order_by("id", true)
//!     .limit(10);
//! let statement = q.build(Dialect::Sqlite)?;
//! ```

mod delete;
mod insert;
mod removal;
mod select;
mod update;

pub use delete::DeleteBuilder;
pub use insert::{InsertBuilder, OnConflict};
pub use removal::RemovalBuilder;
pub use select::SelectBuilder;
pub use update::{Assignment, UpdateBuilder};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }
}

/// A rendered statement: SQL text plus its positional bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    /// An UPDATE (or upsert) was built without a single SET assignment.
    EmptyAssignments,
    /// An INSERT was built without any row.
    EmptyInsert,
    /// `DO UPDATE` needs to know which constraint it resolves.
    MissingConflictTarget,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            QueryError::EmptyAssignments => write!(f, "UPDATE has no SET assignments"),
            QueryError::EmptyInsert => write!(f, "INSERT has no rows"),
            QueryError::MissingConflictTarget => {
                write!(f, "ON CONFLICT DO UPDATE requires a conflict target")
            }
        }
    }
}

impl std::error::Error for QueryError {}

#[derive(Debug, Clone, Copy)]
enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

#[derive(Debug, Clone)]
enum Condition {
    Compare(String, CompareOp, Value),
    In(String, Vec<Value>),
    IsNull(String),
    IsNotNull(String),
}

/// AND-joined predicates shared by SELECT, UPDATE and DELETE.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    conditions: Vec<Condition>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn render(&self, w: &mut SqlWriter) -> Result<(), QueryError> {
        if self.conditions.is_empty() {
            return Ok(());
        }
        w.push(" WHERE ");
        for (idx, cond) in self.conditions.iter().enumerate() {
            if idx > 0 {
                w.push(" AND ");
            }
            match cond {
                Condition::Compare(col, op, val) => {
                    w.column(col)?;
                    w.push(" ");
                    w.push(op.as_sql());
                    w.push(" ");
                    w.bind(val.clone());
                }
                Condition::In(_, vals) if vals.is_empty() => {
                    // Nothing is a member of an empty set.
                    w.push("1 = 0");
                }
                Condition::In(col, vals) => {
                    w.column(col)?;
                    w.push(" IN (");
                    for (i, val) in vals.iter().enumerate() {
                        if i > 0 {
                            w.push(", ");
                        }
                        w.bind(val.clone());
                    }
                    w.push(")");
                }
                Condition::IsNull(col) => {
                    w.column(col)?;
                    w.push(" IS NULL");
                }
                Condition::IsNotNull(col) => {
                    w.column(col)?;
                    w.push(" IS NOT NULL");
                }
            }
        }
        Ok(())
    }
}

/// Predicate methods for builders that carry a WHERE clause.
pub trait Filter: Sized {
    fn where_clause_mut(&mut self) -> &mut WhereClause;

    fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        with_condition(self, compare(column, CompareOp::Eq, value))
    }

    fn where_not_eq(self, column: &str, value: impl Into<Value>) -> Self {
        with_condition(self, compare(column, CompareOp::NotEq, value))
    }

    fn where_gt(self, column: &str, value: impl Into<Value>) -> Self {
        with_condition(self, compare(column, CompareOp::Gt, value))
    }

    fn where_gte(self, column: &str, value: impl Into<Value>) -> Self {
        with_condition(self, compare(column, CompareOp::Gte, value))
    }

    fn where_lt(self, column: &str, value: impl Into<Value>) -> Self {
        with_condition(self, compare(column, CompareOp::Lt, value))
    }

    fn where_lte(self, column: &str, value: impl Into<Value>) -> Self {
        with_condition(self, compare(column, CompareOp::Lte, value))
    }

    fn where_like(self, column: &str, pattern: &str) -> Self {
        with_condition(self, compare(column, CompareOp::Like, pattern))
    }

    fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        with_condition(self, Condition::In(column.to_string(), values))
    }

    fn where_null(self, column: &str) -> Self {
        with_condition(self, Condition::IsNull(column.to_string()))
    }

    fn where_not_null(self, column: &str) -> Self {
        with_condition(self, Condition::IsNotNull(column.to_string()))
    }

    /// Append every predicate of `clause`.
    fn and_where(mut self, clause: WhereClause) -> Self {
        self.where_clause_mut().conditions.extend(clause.conditions);
        self
    }
}

/// A bare predicate list is itself filterable.
impl Filter for WhereClause {
    fn where_clause_mut(&mut self) -> &mut WhereClause {
        self
    }
}

fn compare(column: &str, op: CompareOp, value: impl Into<Value>) -> Condition {
    Condition::Compare(column.to_string(), op, value.into())
}

fn with_condition<F: Filter>(mut filter: F, condition: Condition) -> F {
    filter.where_clause_mut().conditions.push(condition);
    filter
}

/// Accumulates SQL text and bind values, numbering placeholders as it goes.
pub(crate) struct SqlWriter {
    dialect: Dialect,
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub(crate) fn bind(&mut self, value: Value) {
        let placeholder = self.dialect.placeholder(self.params.len() + 1);
        self.sql.push_str(&placeholder);
        self.params.push(value);
    }

    pub(crate) fn column(&mut self, column: &str) -> Result<(), QueryError> {
        let quoted = format_column(column, self.dialect)?;
        self.sql.push_str(&quoted);
        Ok(())
    }

    pub(crate) fn column_list(&mut self, columns: &[String]) -> Result<(), QueryError> {
        for (idx, col) in columns.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.column(col)?;
        }
        Ok(())
    }

    pub(crate) fn returning(&mut self, columns: &[String]) -> Result<(), QueryError> {
        if columns.is_empty() {
            return Ok(());
        }
        self.push(" RETURNING ");
        self.column_list(columns)
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Validate and quote a possibly dotted column name (`tbl.col`).
fn format_column(ident: &str, dialect: Dialect) -> Result<String, QueryError> {
    if ident.is_empty() {
        return Err(QueryError::InvalidIdentifier {
            kind: "column",
            ident: ident.to_string(),
        });
    }
    let mut out = Vec::new();
    for part in ident.split('.') {
        if !is_valid_segment(part) {
            return Err(QueryError::InvalidIdentifier {
                kind: "column",
                ident: ident.to_string(),
            });
        }
        out.push(quote_segment(part, dialect));
    }
    Ok(out.join("."))
}

pub(crate) fn validate_segment(segment: &str, kind: &'static str) -> Result<(), QueryError> {
    if is_valid_segment(segment) {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier {
            kind,
            ident: segment.to_string(),
        })
    }
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn quote_segment(segment: &str, dialect: Dialect) -> String {
    let quote = dialect.quote_char();
    format!("{quote}{segment}{quote}")
}
