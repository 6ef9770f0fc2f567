//! Repository for the `warehouses` table.

use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::warehouse::{CreateWarehouse, UpdateWarehouse, Warehouse, WarehouseFilter};

const COLUMNS: &str = "id, name, address, notes, deleted_at, created_at, updated_at";

/// `$1` = include_deleted, `$2` = search.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')";

/// Provides CRUD operations for warehouses.
pub struct WarehouseRepo;

impl WarehouseRepo {
    /// Insert a new warehouse, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateWarehouse,
    ) -> Result<Warehouse, sqlx::Error> {
        let query = format!(
            "INSERT INTO warehouses (name, address, notes)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.notes)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a warehouse by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Warehouse>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM warehouses WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a warehouse by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warehouses WHERE id = $1");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live warehouse under a shared row lock.
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warehouses WHERE id = $1 AND deleted_at IS NULL FOR SHARE"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List warehouses, newest first.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &WarehouseFilter,
        page: &PageRequest,
    ) -> Result<Page<Warehouse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warehouses WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Warehouse>(&query)
            .bind(page.include_deleted)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM warehouses WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(&filter.search)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update a warehouse. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateWarehouse,
    ) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!(
            "UPDATE warehouses SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                notes = COALESCE($4, notes)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.notes)
            .fetch_optional(&mut *conn)
            .await
    }

    /// `true` if a live warehouse other than `exclude_id` already uses `name`.
    pub async fn exists_by_name(
        conn: &mut PgConnection,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM warehouses
                WHERE name = $1 AND deleted_at IS NULL
                  AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    /// Soft-delete a warehouse by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE warehouses SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted warehouse. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE warehouses SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
