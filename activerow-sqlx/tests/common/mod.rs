#![allow(dead_code)]

use activerow::prelude::*;
use activerow_sqlx::SqlxDatabase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Sqlite;

const SCHEMA: &[&str] = &[
    "CREATE TABLE test_models (id INTEGER PRIMARY KEY, value TEXT NOT NULL, unique_value TEXT NOT NULL)",
    "CREATE UNIQUE INDEX test_models_idx ON test_models (unique_value)",
    "CREATE TABLE profiles (id INTEGER PRIMARY KEY, display_name TEXT NOT NULL, home_url TEXT, login_count INTEGER NOT NULL)",
    "CREATE TABLE timestampable_models (id INTEGER PRIMARY KEY, value TEXT NOT NULL, unique_value TEXT NOT NULL, created_at DATETIME NOT NULL, updated_at DATETIME NOT NULL)",
    "CREATE TABLE soft_deletable_models (id INTEGER PRIMARY KEY, value TEXT NOT NULL, unique_value TEXT NOT NULL, is_deleted BOOLEAN NOT NULL DEFAULT 0, deleted_at DATETIME)",
    "CREATE TABLE audited_models (id INTEGER PRIMARY KEY, value TEXT NOT NULL, created_at DATETIME NOT NULL, updated_at DATETIME NOT NULL, is_deleted BOOLEAN NOT NULL DEFAULT 0, deleted_at DATETIME)",
];

/// A fresh in-memory database with every test table created.
///
/// One connection, kept forever: each `sqlite::memory:` connection is its
/// own database.
pub async fn setup() -> SqlxDatabase<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(&pool).await.expect("create schema");
    }
    SqlxDatabase::new(pool)
}

pub fn unique() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(0, 0).expect("epoch")
}

// ── Plain ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestModel {
    pub id: Option<i64>,
    pub value: String,
    pub unique_value: String,
}

impl TestModel {
    pub fn new(value: &str) -> Self {
        Self::with_unique(value, &unique())
    }

    pub fn with_unique(value: &str, unique_value: &str) -> Self {
        Self {
            id: None,
            value: value.into(),
            unique_value: unique_value.into(),
        }
    }
}

impl Model for TestModel {
    type Id = i64;
    type Lifecycle = Plain;

    fn schema() -> SchemaIdentifier {
        "test_models".into()
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

/// camelCase on the Rust side, snake_case columns in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Option<i64>,
    pub display_name: String,
    pub home_url: Option<String>,
    pub login_count: i64,
}

impl Model for Profile {
    type Id = i64;
    type Lifecycle = Plain;

    fn schema() -> SchemaIdentifier {
        "profiles".into()
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

// ── Timestamps ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampableModel {
    pub id: Option<i64>,
    pub value: String,
    pub unique_value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimestampableModel {
    pub fn new(value: &str) -> Self {
        Self {
            id: None,
            value: value.into(),
            unique_value: unique(),
            created_at: epoch(),
            updated_at: epoch(),
        }
    }
}

impl Model for TimestampableModel {
    type Id = i64;
    type Lifecycle = Timestamps;

    fn schema() -> SchemaIdentifier {
        "timestampable_models".into()
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

impl Timestamped for TimestampableModel {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

// ── Soft delete ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftDeletableModel {
    pub id: Option<i64>,
    pub value: String,
    pub unique_value: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletableModel {
    pub fn new(value: &str) -> Self {
        Self {
            id: None,
            value: value.into(),
            unique_value: unique(),
            is_deleted: false,
            deleted_at: None,
        }
    }
}

impl Model for SoftDeletableModel {
    type Id = i64;
    type Lifecycle = SoftDeletes;

    fn schema() -> SchemaIdentifier {
        "soft_deletable_models".into()
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

impl SoftDeletable for SoftDeletableModel {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
    fn set_deletion(&mut self, is_deleted: bool, deleted_at: Option<DateTime<Utc>>) {
        self.is_deleted = is_deleted;
        self.deleted_at = deleted_at;
    }
}

// ── Both ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditedModel {
    pub id: Option<i64>,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuditedModel {
    pub fn new(value: &str) -> Self {
        Self {
            id: None,
            value: value.into(),
            created_at: epoch(),
            updated_at: epoch(),
            is_deleted: false,
            deleted_at: None,
        }
    }
}

impl Model for AuditedModel {
    type Id = i64;
    type Lifecycle = (Timestamps, SoftDeletes);

    fn schema() -> SchemaIdentifier {
        "audited_models".into()
    }

    fn id(&self) -> Option<&i64> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }
}

impl Timestamped for AuditedModel {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl SoftDeletable for AuditedModel {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
    fn set_deletion(&mut self, is_deleted: bool, deleted_at: Option<DateTime<Utc>>) {
        self.is_deleted = is_deleted;
        self.deleted_at = deleted_at;
    }
}
