//! Cross-table "active dependent" predicates for guarded deletion.
//!
//! Every query follows the same shape: the referencing row exists, its own
//! `deleted_at` is NULL and, for orders, its status is one of
//! [`ACTIVE_STATUSES`]. Results are ids only, ordered ascending.

use fleet_core::conflict::Dependent;
use fleet_core::entity::EntityKind;
use fleet_core::lifecycle::RowState;
use fleet_core::order::ACTIVE_STATUSES;
use fleet_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

/// Provides dependent lookups and table-generic row state reads.
pub struct DependencyRepo;

fn active_status_names() -> Vec<&'static str> {
    ACTIVE_STATUSES.iter().map(|s| s.as_str()).collect()
}

impl DependencyRepo {
    // ── Dispatch ──────────────────────────────────────────────────────

    /// Ids of active `dependent` rows that reference `(kind, id)`.
    ///
    /// Pairs outside the guard table have no dependents and return empty.
    pub async fn active_dependents(
        conn: &mut PgConnection,
        kind: EntityKind,
        id: DbId,
        dependent: Dependent,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        match (kind, dependent) {
            (EntityKind::ClientObject, Dependent::Orders) => {
                Self::active_orders_for_object(conn, id).await
            }
            (EntityKind::ClientObject, Dependent::Equipment) => {
                Self::equipment_at_client_object(conn, id).await
            }
            (EntityKind::Warehouse, Dependent::Equipment) => {
                Self::equipment_at_warehouse(conn, id).await
            }
            (EntityKind::Driver, Dependent::Transports) => {
                Self::transports_driven_by(conn, id).await
            }
            (EntityKind::Equipment, Dependent::Transports) => {
                Self::transports_carrying(conn, id).await
            }
            (EntityKind::Transport, Dependent::Drivers) => Self::driver_of_transport(conn, id).await,
            (EntityKind::Transport, Dependent::Equipment) => {
                Self::equipment_on_transport(conn, id).await
            }
            (EntityKind::Transport, Dependent::Orders) => {
                Self::active_orders_for_transport(conn, id).await
            }
            _ => Ok(Vec::new()),
        }
    }

    // ── Client object ─────────────────────────────────────────────────

    /// Live orders in an active status whose `object_id` is `object_id`.
    pub async fn active_orders_for_object(
        conn: &mut PgConnection,
        object_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM orders
             WHERE object_id = $1 AND deleted_at IS NULL AND status = ANY($2)
             ORDER BY id",
        )
        .bind(object_id)
        .bind(active_status_names())
        .fetch_all(&mut *conn)
        .await
    }

    /// Live equipment placed at the client object.
    pub async fn equipment_at_client_object(
        conn: &mut PgConnection,
        object_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM equipment
             WHERE client_object_id = $1 AND deleted_at IS NULL
             ORDER BY id",
        )
        .bind(object_id)
        .fetch_all(&mut *conn)
        .await
    }

    // ── Warehouse ─────────────────────────────────────────────────────

    /// Live equipment placed at the warehouse.
    pub async fn equipment_at_warehouse(
        conn: &mut PgConnection,
        warehouse_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM equipment
             WHERE warehouse_id = $1 AND deleted_at IS NULL
             ORDER BY id",
        )
        .bind(warehouse_id)
        .fetch_all(&mut *conn)
        .await
    }

    // ── Driver ────────────────────────────────────────────────────────

    /// Live transports whose current driver is `driver_id`.
    pub async fn transports_driven_by(
        conn: &mut PgConnection,
        driver_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM transports
             WHERE current_driver_id = $1 AND deleted_at IS NULL
             ORDER BY id",
        )
        .bind(driver_id)
        .fetch_all(&mut *conn)
        .await
    }

    // ── Equipment ─────────────────────────────────────────────────────

    /// Live transports the unit is attached to, either as the transport's
    /// current equipment or through the unit's own transport placement.
    pub async fn transports_carrying(
        conn: &mut PgConnection,
        equipment_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT t.id FROM transports t
             WHERE t.deleted_at IS NULL
               AND (t.current_equipment_id = $1
                    OR t.id = (SELECT e.transport_id FROM equipment e WHERE e.id = $1))
             ORDER BY t.id",
        )
        .bind(equipment_id)
        .fetch_all(&mut *conn)
        .await
    }

    // ── Transport ─────────────────────────────────────────────────────

    /// The transport's current driver, if that driver is live.
    pub async fn driver_of_transport(
        conn: &mut PgConnection,
        transport_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT d.id FROM transports t
             JOIN drivers d ON d.id = t.current_driver_id
             WHERE t.id = $1 AND d.deleted_at IS NULL
             ORDER BY d.id",
        )
        .bind(transport_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Live equipment on the transport: placed there, or recorded as its
    /// current equipment.
    pub async fn equipment_on_transport(
        conn: &mut PgConnection,
        transport_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT e.id FROM equipment e
             WHERE e.deleted_at IS NULL
               AND (e.transport_id = $1
                    OR e.id = (SELECT t.current_equipment_id FROM transports t WHERE t.id = $1))
             ORDER BY e.id",
        )
        .bind(transport_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Live orders in an active status assigned to the transport.
    pub async fn active_orders_for_transport(
        conn: &mut PgConnection,
        transport_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM orders
             WHERE transport_id = $1 AND deleted_at IS NULL AND status = ANY($2)
             ORDER BY id",
        )
        .bind(transport_id)
        .bind(active_status_names())
        .fetch_all(&mut *conn)
        .await
    }

    // ── Row state ─────────────────────────────────────────────────────

    /// Deletion state of `(kind, id)`, or `None` if no row exists.
    pub async fn row_state(
        conn: &mut PgConnection,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RowState>, sqlx::Error> {
        let sql = format!("SELECT deleted_at FROM {} WHERE id = $1", kind.table());
        let row = sqlx::query_scalar::<_, Option<Timestamp>>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(to_row_state))
    }

    /// Like [`row_state`](Self::row_state) but takes `FOR UPDATE` on the row,
    /// held until the transaction ends.
    pub async fn lock_row(
        conn: &mut PgConnection,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RowState>, sqlx::Error> {
        let sql = format!(
            "SELECT deleted_at FROM {} WHERE id = $1 FOR UPDATE",
            kind.table()
        );
        let row = sqlx::query_scalar::<_, Option<Timestamp>>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(to_row_state))
    }
}

fn to_row_state(deleted_at: Option<Timestamp>) -> RowState {
    match deleted_at {
        Some(_) => RowState::Deleted,
        None => RowState::Live,
    }
}
