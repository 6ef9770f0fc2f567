//! Repository for the `equipment` table.
//!
//! Placement columns are always written as a triple so a relocation clears
//! the previous slot in the same statement.

use fleet_core::pagination::{Page, PageRequest};
use fleet_core::placement::Placement;
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::equipment::{CreateEquipment, Equipment, EquipmentFilter, UpdateEquipment};

const COLUMNS: &str = "id, equipment_type, volume, condition, notes, \
                       transport_id, client_object_id, warehouse_id, \
                       deleted_at, created_at, updated_at";

/// `$1` = include_deleted, `$2` = equipment_type, `$3` = placed_in,
/// `$4` = placement_id, `$5` = unplaced.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::TEXT IS NULL OR equipment_type = $2) \
     AND ($3::TEXT IS NULL \
          OR ($3 = 'transport' AND transport_id IS NOT NULL \
              AND ($4::BIGINT IS NULL OR transport_id = $4)) \
          OR ($3 = 'client_object' AND client_object_id IS NOT NULL \
              AND ($4::BIGINT IS NULL OR client_object_id = $4)) \
          OR ($3 = 'warehouse' AND warehouse_id IS NOT NULL \
              AND ($4::BIGINT IS NULL OR warehouse_id = $4))) \
     AND (NOT $5::BOOLEAN OR num_nonnulls(transport_id, client_object_id, warehouse_id) = 0)";

/// Provides CRUD and placement operations for equipment.
pub struct EquipmentRepo;

impl EquipmentRepo {
    /// Insert a new unit at `placement` (or unplaced when `None`).
    ///
    /// The placement is taken from the already-validated argument, not from
    /// the raw placement fields of `input`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateEquipment,
        placement: Option<Placement>,
    ) -> Result<Equipment, sqlx::Error> {
        let cols = placement.map(Placement::columns).unwrap_or_default();
        let query = format!(
            "INSERT INTO equipment
                (equipment_type, volume, condition, notes, transport_id, client_object_id, warehouse_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(&input.equipment_type)
            .bind(input.volume)
            .bind(&input.condition)
            .bind(&input.notes)
            .bind(cols.transport_id)
            .bind(cols.client_object_id)
            .bind(cols.warehouse_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a unit by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a unit by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment WHERE id = $1");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live unit under a shared row lock.
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM equipment WHERE id = $1 AND deleted_at IS NULL FOR SHARE"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live unit and lock it for a read-modify-write.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM equipment WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lock every live unit in `ids` for update, in ascending `id` order.
    ///
    /// Missing and soft-deleted ids are left out of the result.
    pub async fn find_many_for_update(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<Equipment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM equipment
             WHERE id = ANY($1) AND deleted_at IS NULL
             ORDER BY id
             FOR UPDATE"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
    }

    /// List units, newest first. Soft-deleted rows are included only when
    /// `page.include_deleted` is set.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &EquipmentFilter,
        page: &PageRequest,
    ) -> Result<Page<Equipment>, sqlx::Error> {
        let placed_in = filter.placed_in.map(|slot| slot.as_str());
        let query = format!(
            "SELECT {COLUMNS} FROM equipment WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, Equipment>(&query)
            .bind(page.include_deleted)
            .bind(&filter.equipment_type)
            .bind(placed_in)
            .bind(filter.placement_id)
            .bind(filter.unplaced)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM equipment WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(&filter.equipment_type)
            .bind(placed_in)
            .bind(filter.placement_id)
            .bind(filter.unplaced)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update a unit's attributes. When `placement` is `Some`, the unit is
    /// moved there and the other two slots are cleared; `None` keeps the
    /// current placement.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateEquipment,
        placement: Option<Placement>,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let relocate = placement.is_some();
        let cols = placement.map(Placement::columns).unwrap_or_default();
        let query = format!(
            "UPDATE equipment SET
                equipment_type = COALESCE($2, equipment_type),
                volume = COALESCE($3, volume),
                condition = COALESCE($4, condition),
                notes = COALESCE($5, notes),
                transport_id = CASE WHEN $6 THEN $7 ELSE transport_id END,
                client_object_id = CASE WHEN $6 THEN $8 ELSE client_object_id END,
                warehouse_id = CASE WHEN $6 THEN $9 ELSE warehouse_id END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .bind(&input.equipment_type)
            .bind(input.volume)
            .bind(&input.condition)
            .bind(&input.notes)
            .bind(relocate)
            .bind(cols.transport_id)
            .bind(cols.client_object_id)
            .bind(cols.warehouse_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Overwrite the placement triple. `None` leaves the unit unplaced.
    pub async fn set_placement(
        conn: &mut PgConnection,
        id: DbId,
        placement: Option<Placement>,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let cols = placement.map(Placement::columns).unwrap_or_default();
        let query = format!(
            "UPDATE equipment SET
                transport_id = $2,
                client_object_id = $3,
                warehouse_id = $4
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .bind(cols.transport_id)
            .bind(cols.client_object_id)
            .bind(cols.warehouse_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Soft-delete a unit by ID. Returns `true` if a live row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE equipment SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted unit. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE equipment SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
