//! Repository for the `drivers` table.

use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::driver::{CreateDriver, Driver, DriverFilter, UpdateDriver};

const COLUMNS: &str = "id, full_name, phone, license_no, license_class, photo, \
                       deleted_at, created_at, updated_at";

/// `$1` = include_deleted, `$2` = search.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::TEXT IS NULL OR full_name ILIKE '%' || $2 || '%' OR license_no ILIKE '%' || $2 || '%')";

/// Provides CRUD operations for drivers.
pub struct DriverRepo;

impl DriverRepo {
    /// Insert a new driver, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreateDriver) -> Result<Driver, sqlx::Error> {
        let query = format!(
            "INSERT INTO drivers (full_name, phone, license_no, license_class, photo)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Driver>(&query)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.license_no)
            .bind(&input.license_class)
            .bind(&input.photo)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a driver by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drivers WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Driver>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a driver by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drivers WHERE id = $1");
        sqlx::query_as::<_, Driver>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live driver under a shared row lock.
    pub async fn find_for_share(conn: &mut PgConnection, id: DbId) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drivers WHERE id = $1 AND deleted_at IS NULL FOR SHARE"
        );
        sqlx::query_as::<_, Driver>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List drivers, newest first.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &DriverFilter,
        page: &PageRequest,
    ) -> Result<Page<Driver>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drivers WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Driver>(&query)
            .bind(page.include_deleted)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM drivers WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(&filter.search)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update a driver. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateDriver,
    ) -> Result<Option<Driver>, sqlx::Error> {
        let query = format!(
            "UPDATE drivers SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                license_no = COALESCE($4, license_no),
                license_class = COALESCE($5, license_class),
                photo = COALESCE($6, photo)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Driver>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.license_no)
            .bind(&input.license_class)
            .bind(&input.photo)
            .fetch_optional(&mut *conn)
            .await
    }

    /// `true` if a live driver other than `exclude_id` holds `license_no`.
    pub async fn exists_by_license_no(
        conn: &mut PgConnection,
        license_no: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM drivers
                WHERE license_no = $1 AND deleted_at IS NULL
                  AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(license_no)
        .bind(exclude_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    /// Soft-delete a driver by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE drivers SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted driver. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE drivers SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
