//! Transaction wrappers around the core lifecycle manager.

use fleet_core::conflict::ConflictReport;
use fleet_core::entity::EntityKind;
use fleet_core::lifecycle::{self, LifecycleError};
use fleet_core::types::DbId;
use fleet_db::PgLifecycleStore;
use sqlx::{PgConnection, PgPool};

use crate::error::{unique_violation, ServiceResult};

/// Read-only conflict report for a live row.
pub(crate) async fn check_delete_conflicts(
    pool: &PgPool,
    kind: EntityKind,
    id: DbId,
) -> ServiceResult<ConflictReport> {
    let mut conn = pool.acquire().await?;
    let mut store = PgLifecycleStore::new(&mut conn);
    Ok(lifecycle::check_delete_conflicts(&mut store, kind, id).await?)
}

/// Guarded soft-delete in its own transaction.
pub(crate) async fn delete(pool: &PgPool, kind: EntityKind, id: DbId) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    delete_in(&mut tx, kind, id).await?;
    tx.commit().await?;
    Ok(())
}

/// Guarded soft-delete inside the caller's transaction.
pub(crate) async fn delete_in(
    conn: &mut PgConnection,
    kind: EntityKind,
    id: DbId,
) -> ServiceResult<()> {
    let mut store = PgLifecycleStore::new(conn);
    lifecycle::delete(&mut store, kind, id).await?;
    Ok(())
}

/// Restore in its own transaction.
pub(crate) async fn restore(pool: &PgPool, kind: EntityKind, id: DbId) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    restore_in(&mut tx, kind, id).await?;
    tx.commit().await?;
    Ok(())
}

pub(crate) async fn restore_in(
    conn: &mut PgConnection,
    kind: EntityKind,
    id: DbId,
) -> ServiceResult<()> {
    let mut store = PgLifecycleStore::new(conn);
    lifecycle::restore(&mut store, kind, id).await?;
    Ok(())
}

/// Restore inside the caller's transaction for a kind with a unique column.
///
/// A partial unique index violation on `field` (another live row claimed
/// `value` after the caller's pre-check) is reported as `DuplicateKey`.
pub(crate) async fn restore_unique_in(
    conn: &mut PgConnection,
    kind: EntityKind,
    id: DbId,
    field: &'static str,
    value: &str,
) -> ServiceResult<()> {
    let mut store = PgLifecycleStore::new(conn);
    match lifecycle::restore(&mut store, kind, id).await {
        Ok(()) => Ok(()),
        Err(LifecycleError::Store(err)) => Err(unique_violation(err, kind, field, value)),
        Err(err) => Err(err.into()),
    }
}
