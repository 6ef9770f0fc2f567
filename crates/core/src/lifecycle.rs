//! Guarded lifecycle manager.
//!
//! Decides whether a soft-delete is safe and performs it, or returns a
//! [`ConflictReport`] naming every blocking dependent. Restore clears the
//! deletion marker without re-validating dependents.
//!
//! All functions here run against a single [`LifecycleStore`], which the
//! caller binds to one database transaction. `delete` locks the target row
//! before computing the report, so the check and the mutation see the same
//! dependents. Writers that add a reference to the row take a shared lock on
//! it in their own transaction and therefore queue behind the delete.
//! Dropping the transaction without committing discards the soft-delete.

use async_trait::async_trait;

use crate::conflict::{guarded_dependents, ConflictReport, Dependent};
use crate::entity::EntityKind;
use crate::error::CoreError;
use crate::types::DbId;

/// Visibility state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Live,
    Deleted,
}

/// Narrow storage seam used by the lifecycle manager.
///
/// Implementations are expected to execute every call inside the same
/// transaction for the lifetime of the value.
#[async_trait]
pub trait LifecycleStore: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the row's deletion state without locking. `None` if no row exists.
    async fn row_state(
        &mut self,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RowState>, Self::Error>;

    /// Lock the row exclusively until the transaction ends and return its
    /// deletion state. `None` if no row exists.
    async fn lock_row(
        &mut self,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RowState>, Self::Error>;

    /// Ids of active rows of category `dependent` that reference `(kind, id)`.
    async fn active_dependents(
        &mut self,
        kind: EntityKind,
        id: DbId,
        dependent: Dependent,
    ) -> Result<Vec<DbId>, Self::Error>;

    /// Set `deleted_at`. Returns `false` when no live row was affected.
    async fn soft_delete(&mut self, kind: EntityKind, id: DbId) -> Result<bool, Self::Error>;

    /// Clear `deleted_at`. Returns `false` when no deleted row was affected.
    async fn restore(&mut self, kind: EntityKind, id: DbId) -> Result<bool, Self::Error>;
}

/// Failure of a lifecycle operation: a domain rule or the store itself.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError<E> {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage failure: {0}")]
    Store(#[source] E),
}

pub type LifecycleResult<T, E> = Result<T, LifecycleError<E>>;

fn not_found<E>(kind: EntityKind, id: DbId) -> LifecycleError<E> {
    LifecycleError::Core(CoreError::NotFound {
        entity: kind.label(),
        id,
    })
}

/// Build the conflict report for a live row without mutating anything.
///
/// Fails with `NotFound` if the row does not exist or is soft-deleted.
pub async fn check_delete_conflicts<S>(
    store: &mut S,
    kind: EntityKind,
    id: DbId,
) -> LifecycleResult<ConflictReport, S::Error>
where
    S: LifecycleStore + ?Sized,
{
    match store
        .row_state(kind, id)
        .await
        .map_err(LifecycleError::Store)?
    {
        Some(RowState::Live) => collect_conflicts(store, kind, id).await,
        Some(RowState::Deleted) | None => Err(not_found(kind, id)),
    }
}

/// Query every dependent category guarding `kind`.
async fn collect_conflicts<S>(
    store: &mut S,
    kind: EntityKind,
    id: DbId,
) -> LifecycleResult<ConflictReport, S::Error>
where
    S: LifecycleStore + ?Sized,
{
    let mut report = ConflictReport::new(kind, id);
    for &dependent in guarded_dependents(kind) {
        let ids = store
            .active_dependents(kind, id, dependent)
            .await
            .map_err(LifecycleError::Store)?;
        report.record(dependent, ids);
    }
    tracing::debug!(
        entity = kind.label(),
        id,
        blocked = report.is_blocked(),
        "Computed delete conflicts"
    );
    Ok(report)
}

/// Guarded soft-delete.
///
/// Locks the row, computes the conflict report and soft-deletes only when
/// the report is empty.
///
/// Errors: `NotFound` (no row), `AlreadyDeleted` (row already soft-deleted),
/// `Conflict` (active dependents, report attached).
pub async fn delete<S>(store: &mut S, kind: EntityKind, id: DbId) -> LifecycleResult<(), S::Error>
where
    S: LifecycleStore + ?Sized,
{
    match store.lock_row(kind, id).await.map_err(LifecycleError::Store)? {
        None => return Err(not_found(kind, id)),
        Some(RowState::Deleted) => {
            return Err(CoreError::AlreadyDeleted {
                entity: kind.label(),
                id,
            }
            .into())
        }
        Some(RowState::Live) => {}
    }

    let report = collect_conflicts(store, kind, id).await?;
    if report.is_blocked() {
        tracing::warn!(
            entity = kind.label(),
            id,
            conflicts = %report.message(),
            "Delete blocked by active dependents"
        );
        return Err(CoreError::from(report).into());
    }

    if !store.soft_delete(kind, id).await.map_err(LifecycleError::Store)? {
        return Err(not_found(kind, id));
    }
    tracing::info!(entity = kind.label(), id, "Soft-deleted");
    Ok(())
}

/// Clear the deletion marker. Dependents are neither re-checked nor revived.
///
/// Errors: `NotFound` (no row), `NotDeleted` (row is live).
pub async fn restore<S>(store: &mut S, kind: EntityKind, id: DbId) -> LifecycleResult<(), S::Error>
where
    S: LifecycleStore + ?Sized,
{
    match store.lock_row(kind, id).await.map_err(LifecycleError::Store)? {
        None => return Err(not_found(kind, id)),
        Some(RowState::Live) => {
            return Err(CoreError::NotDeleted {
                entity: kind.label(),
                id,
            }
            .into())
        }
        Some(RowState::Deleted) => {}
    }

    if !store.restore(kind, id).await.map_err(LifecycleError::Store)? {
        return Err(not_found(kind, id));
    }
    tracing::info!(entity = kind.label(), id, "Restored");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
