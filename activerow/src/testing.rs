//! In-memory `Database` that records statements and replays scripted rows.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use crate::database::{Database, Row};
use crate::error::DataError;
use crate::query::{Dialect, Statement};
use crate::value::Value;

pub(crate) struct RecordingDb {
    dialect: Dialect,
    statements: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<Vec<Row>>>,
}

impl RecordingDb {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue the rows returned by the next `fetch_all`.
    pub(crate) fn respond(&self, rows: Vec<Row>) {
        self.responses.lock().unwrap().push_back(rows);
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Statement {
        self.statements
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no statement executed")
    }
}

impl Database for RecordingDb {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn fetch_all(&self, statement: Statement) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send {
        self.statements.lock().unwrap().push(statement);
        let rows = self.responses.lock().unwrap().pop_front().unwrap_or_default();
        async move { Ok(rows) }
    }

    fn execute(&self, statement: Statement) -> impl Future<Output = Result<u64, DataError>> + Send {
        self.statements.lock().unwrap().push(statement);
        async { Ok(1) }
    }
}

/// A single-column `id` row.
pub(crate) fn id_row(id: i64) -> Row {
    Row::new(vec![("id".to_string(), Value::Int(id))])
}
