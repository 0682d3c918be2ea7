//! SQLite statement execution and row conversion.
//!
//! Values are bound by kind: timestamps as RFC 3339 text, JSON as its text
//! form, `NULL` as an untyped null. Result columns are read back by storage
//! class, except that columns declared `BOOLEAN` come back as booleans.

use std::future::Future;

use activerow::value::format_timestamp;
use activerow::{DataError, Dialect, Row, Statement, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::database::SqlxDatabase;
use crate::error::SqlxErrorExt;

impl activerow::Database for SqlxDatabase<Sqlite> {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn fetch_all(&self, statement: Statement) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send {
        async move {
            let Statement { sql, params } = statement;
            let rows = params
                .into_iter()
                .fold(sqlx::query::<Sqlite>(&sql), bind)
                .fetch_all(self.pool())
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            rows.iter().map(convert_row).collect()
        }
    }

    fn execute(&self, statement: Statement) -> impl Future<Output = Result<u64, DataError>> + Send {
        async move {
            let Statement { sql, params } = statement;
            let result = params
                .into_iter()
                .fold(sqlx::query::<Sqlite>(&sql), bind)
                .execute(self.pool())
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            Ok(result.rows_affected())
        }
    }
}

fn bind<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(b),
        Value::Int(i) => query.bind(i),
        Value::Float(f) => query.bind(f),
        Value::Text(s) => query.bind(s),
        Value::Bytes(b) => query.bind(b),
        Value::Timestamp(ts) => query.bind(format_timestamp(&ts)),
        Value::Json(json) => query.bind(json.to_string()),
    }
}

pub(crate) fn convert_row(row: &SqliteRow) -> Result<Row, DataError> {
    let mut columns = Vec::with_capacity(row.len());
    for column in row.columns() {
        let value = convert_value(row, column.ordinal(), column.type_info().name())?;
        columns.push((column.name().to_string(), value));
    }
    Ok(Row::new(columns))
}

fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> Result<Value, DataError> {
    let raw = row.try_get_raw(index).map_err(SqlxErrorExt::into_data_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_string();
    let value = if declared.eq_ignore_ascii_case("BOOLEAN") {
        Value::Bool(get::<bool>(row, index)?)
    } else {
        match storage.as_str() {
            "INTEGER" => Value::Int(get::<i64>(row, index)?),
            "REAL" => Value::Float(get::<f64>(row, index)?),
            "BLOB" => Value::Bytes(get::<Vec<u8>>(row, index)?),
            _ => Value::Text(get::<String>(row, index)?),
        }
    };
    Ok(value)
}

fn get<'r, T>(row: &'r SqliteRow, index: usize) -> Result<T, DataError>
where
    T: sqlx::Decode<'r, Sqlite>,
{
    row.try_get_unchecked::<T, _>(index)
        .map_err(SqlxErrorExt::into_data_error)
}
