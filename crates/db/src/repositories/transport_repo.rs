//! Repository for the `transports` table.

use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::transport::{CreateTransport, Transport, TransportFilter, UpdateTransport};

const COLUMNS: &str = "id, plate_no, brand, model, capacity, status, \
                       current_driver_id, current_equipment_id, \
                       deleted_at, created_at, updated_at";

/// `$1` = include_deleted, `$2` = status, `$3` = search.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::TEXT IS NULL OR status = $2) \
     AND ($3::TEXT IS NULL OR plate_no ILIKE '%' || $3 || '%')";

/// Provides CRUD and assignment operations for transports.
pub struct TransportRepo;

impl TransportRepo {
    /// Insert a new transport. A missing status defaults to `IN_WORK`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateTransport,
    ) -> Result<Transport, sqlx::Error> {
        let query = format!(
            "INSERT INTO transports
                (plate_no, brand, model, capacity, status, current_driver_id, current_equipment_id)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'IN_WORK'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transport>(&query)
            .bind(&input.plate_no)
            .bind(&input.brand)
            .bind(&input.model)
            .bind(input.capacity)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.current_driver_id)
            .bind(input.current_equipment_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a transport by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transports WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a transport by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transports WHERE id = $1");
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live transport under a shared row lock.
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transports WHERE id = $1 AND deleted_at IS NULL FOR SHARE"
        );
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live transport and lock it for a read-modify-write.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transports WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List transports, newest first.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &TransportFilter,
        page: &PageRequest,
    ) -> Result<Page<Transport>, sqlx::Error> {
        let status = filter.status.map(|s| s.as_str());
        let query = format!(
            "SELECT {COLUMNS} FROM transports WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, Transport>(&query)
            .bind(page.include_deleted)
            .bind(status)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM transports WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(status)
            .bind(&filter.search)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update a transport. Only non-`None` fields in `input` are applied.
    ///
    /// Driver and equipment slots are written through the `assign_*` methods.
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateTransport,
    ) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!(
            "UPDATE transports SET
                plate_no = COALESCE($2, plate_no),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                capacity = COALESCE($5, capacity),
                status = COALESCE($6, status)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .bind(&input.plate_no)
            .bind(&input.brand)
            .bind(&input.model)
            .bind(input.capacity)
            .bind(input.status.map(|s| s.as_str()))
            .fetch_optional(&mut *conn)
            .await
    }

    /// `true` if a live transport other than `exclude_id` carries `plate_no`.
    pub async fn exists_by_plate_no(
        conn: &mut PgConnection,
        plate_no: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM transports
                WHERE plate_no = $1 AND deleted_at IS NULL
                  AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(plate_no)
        .bind(exclude_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    /// Set or clear the current driver.
    pub async fn assign_driver(
        conn: &mut PgConnection,
        id: DbId,
        driver_id: Option<DbId>,
    ) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!(
            "UPDATE transports SET current_driver_id = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .bind(driver_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Set or clear the current equipment.
    pub async fn assign_equipment(
        conn: &mut PgConnection,
        id: DbId,
        equipment_id: Option<DbId>,
    ) -> Result<Option<Transport>, sqlx::Error> {
        let query = format!(
            "UPDATE transports SET current_equipment_id = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transport>(&query)
            .bind(id)
            .bind(equipment_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Clear `current_equipment_id` on every transport that points at
    /// `equipment_id`, except `keep_transport_id`. Returns rows affected.
    pub async fn detach_equipment(
        conn: &mut PgConnection,
        equipment_id: DbId,
        keep_transport_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transports SET current_equipment_id = NULL
             WHERE current_equipment_id = $1
               AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(equipment_id)
        .bind(keep_transport_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Soft-delete a transport by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transports SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted transport. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transports SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
