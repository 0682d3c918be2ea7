//! Opt-in behaviour layered onto the base CRUD operations.
//!
//! A model declares its overlays through [`Model::Lifecycle`]:
//!
//! | `type Lifecycle =`         | insert            | update       | delete             |
//! |----------------------------|-------------------|--------------|--------------------|
//! | [`Plain`]                  | -                 | -            | `DELETE`           |
//! | [`Timestamps`]             | stamps both dates | `updated_at` | `DELETE`           |
//! | [`SoftDeletes`]            | -                 | -            | `UPDATE` (flagged) |
//! | `(Timestamps, SoftDeletes)`| stamps both dates | `updated_at` | `UPDATE` (flagged) |
//!
//! Dispatch is static: the engine calls the hooks of `M::Lifecycle`, and a
//! tuple runs its members in order, so one overlay never discards another's
//! mutation.

use chrono::{DateTime, Utc};

use crate::model::Model;
use crate::query::Assignment;
use crate::value::Value;

/// Extra `SET` pairs contributed by an overlay.
pub type Assignments = Vec<(&'static str, Assignment)>;

/// Hooks the CRUD and batch engines run around statement synthesis.
///
/// Every hook defaults to a no-op. `now` is captured once per operation and
/// shared by all hooks (and all batch elements) of that operation.
pub trait Lifecycle<M> {
    /// Before a row is encoded for INSERT.
    fn on_insert(_entity: &mut M, _now: DateTime<Utc>) {}

    /// Before a bound entity is encoded for UPDATE.
    fn on_update(_entity: &mut M, _now: DateTime<Utc>) {}

    /// Before a bound entity is deleted.
    fn on_delete(_entity: &mut M, _now: DateTime<Utc>) {}

    /// Assignments added to predicate-driven (bulk) updates.
    fn update_assignments(_now: DateTime<Utc>) -> Assignments {
        Vec::new()
    }

    /// Non-empty turns deletion into an UPDATE with these assignments.
    fn delete_assignments(_now: DateTime<Utc>) -> Assignments {
        Vec::new()
    }

    /// Like [`delete_assignments`](Self::delete_assignments), for one bound
    /// entity after [`on_delete`](Self::on_delete) ran.
    fn entity_delete_assignments(_entity: &M, now: DateTime<Utc>) -> Assignments {
        Self::delete_assignments(now)
    }
}

/// No overlays: plain INSERT/UPDATE/DELETE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl<M> Lifecycle<M> for Plain {}

/// Maintains `created_at` / `updated_at`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamps;

/// Replaces deletion with `is_deleted = true, deleted_at = now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftDeletes;

/// A model that records when it was inserted and last updated.
pub trait Timestamped: Model {
    const CREATED_AT: &'static str = "created_at";
    const UPDATED_AT: &'static str = "updated_at";

    fn created_at(&self) -> DateTime<Utc>;
    fn set_created_at(&mut self, at: DateTime<Utc>);
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// A model whose rows are flagged instead of removed.
///
/// `deleted_at()` is present exactly when `is_deleted()` is true.
pub trait SoftDeletable: Model {
    const IS_DELETED: &'static str = "is_deleted";
    const DELETED_AT: &'static str = "deleted_at";

    fn is_deleted(&self) -> bool;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deletion(&mut self, is_deleted: bool, deleted_at: Option<DateTime<Utc>>);

    /// Flag the entity as deleted. The timestamp is only taken on the first
    /// transition; deleting again keeps it.
    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        if !self.is_deleted() || self.deleted_at().is_none() {
            self.set_deletion(true, Some(now));
        }
    }
}

impl<M: Timestamped> Lifecycle<M> for Timestamps {
    fn on_insert(entity: &mut M, now: DateTime<Utc>) {
        entity.set_created_at(now);
        entity.set_updated_at(now);
    }

    fn on_update(entity: &mut M, now: DateTime<Utc>) {
        entity.set_updated_at(now);
    }

    fn update_assignments(now: DateTime<Utc>) -> Assignments {
        vec![(M::UPDATED_AT, Assignment::Value(Value::from(now)))]
    }
}

impl<M: SoftDeletable> Lifecycle<M> for SoftDeletes {
    fn on_delete(entity: &mut M, now: DateTime<Utc>) {
        entity.mark_deleted(now);
    }

    /// Rows already flagged keep their stored `deleted_at`.
    fn delete_assignments(now: DateTime<Utc>) -> Assignments {
        vec![
            (M::IS_DELETED, Assignment::Value(Value::Bool(true))),
            (M::DELETED_AT, Assignment::IfNull(Value::from(now))),
        ]
    }

    fn entity_delete_assignments(entity: &M, now: DateTime<Utc>) -> Assignments {
        vec![
            (M::IS_DELETED, Assignment::Value(Value::Bool(true))),
            (
                M::DELETED_AT,
                Assignment::Value(Value::from(entity.deleted_at().unwrap_or(now))),
            ),
        ]
    }
}

impl<M, A, B> Lifecycle<M> for (A, B)
where
    A: Lifecycle<M>,
    B: Lifecycle<M>,
{
    fn on_insert(entity: &mut M, now: DateTime<Utc>) {
        A::on_insert(entity, now);
        B::on_insert(entity, now);
    }

    fn on_update(entity: &mut M, now: DateTime<Utc>) {
        A::on_update(entity, now);
        B::on_update(entity, now);
    }

    fn on_delete(entity: &mut M, now: DateTime<Utc>) {
        A::on_delete(entity, now);
        B::on_delete(entity, now);
    }

    fn update_assignments(now: DateTime<Utc>) -> Assignments {
        let mut out = A::update_assignments(now);
        out.extend(B::update_assignments(now));
        out
    }

    fn delete_assignments(now: DateTime<Utc>) -> Assignments {
        let mut out = A::delete_assignments(now);
        out.extend(B::delete_assignments(now));
        out
    }

    fn entity_delete_assignments(entity: &M, now: DateTime<Utc>) -> Assignments {
        let mut out = A::entity_delete_assignments(entity, now);
        out.extend(B::entity_delete_assignments(entity, now));
        out
    }
}
