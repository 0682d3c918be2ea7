use crate::query::QueryError;

/// Errors that can occur in the record layer.
#[derive(Debug)]
pub enum DataError {
    /// The operation addresses a persisted row but the entity has no id yet.
    IdRequired,
    /// The statement could not be built.
    Query(QueryError),
    /// A model could not be turned into column values.
    Encode(String),
    /// A result row could not be turned into the requested type.
    Decode(String),
    /// Failure reported by the execution engine, passed through untouched.
    Database(Box<dyn std::error::Error + Send + Sync>),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by executor crates (e.g. `activerow-sqlx`) to wrap
    /// driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn is_id_required(&self) -> bool {
        matches!(self, DataError::IdRequired)
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::IdRequired => write!(f, "Id required: entity has not been persisted"),
            DataError::Query(err) => write!(f, "Query error: {err}"),
            DataError::Encode(msg) => write!(f, "Encode error: {msg}"),
            DataError::Decode(msg) => write!(f, "Decode error: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Query(err) => Some(err),
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::Query(err)
    }
}

/// Convenience alias for record-layer results.
pub type DataResult<T> = Result<T, DataError>;
