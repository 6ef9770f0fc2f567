//! Repository for the `client_objects` table.

use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::client_object::{
    ClientObject, ClientObjectFilter, CreateClientObject, UpdateClientObject,
};

const COLUMNS: &str = "id, client_id, name, address, latitude, longitude, notes, \
                       deleted_at, created_at, updated_at";

/// `$1` = include_deleted, `$2` = client_id, `$3` = search.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::BIGINT IS NULL OR client_id = $2) \
     AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%' OR address ILIKE '%' || $3 || '%')";

/// Provides CRUD operations for client objects.
pub struct ClientObjectRepo;

impl ClientObjectRepo {
    /// Insert a new client object, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateClientObject,
    ) -> Result<ClientObject, sqlx::Error> {
        let query = format!(
            "INSERT INTO client_objects (client_id, name, address, latitude, longitude, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClientObject>(&query)
            .bind(input.client_id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.notes)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a client object by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ClientObject>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM client_objects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, ClientObject>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a client object by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ClientObject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_objects WHERE id = $1");
        sqlx::query_as::<_, ClientObject>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live client object under a shared row lock.
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ClientObject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_objects WHERE id = $1 AND deleted_at IS NULL FOR SHARE"
        );
        sqlx::query_as::<_, ClientObject>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List client objects, newest first.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &ClientObjectFilter,
        page: &PageRequest,
    ) -> Result<Page<ClientObject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_objects WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, ClientObject>(&query)
            .bind(page.include_deleted)
            .bind(filter.client_id)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM client_objects WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(filter.client_id)
            .bind(&filter.search)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update a client object. Only non-`None` fields in `input` are applied.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateClientObject,
    ) -> Result<Option<ClientObject>, sqlx::Error> {
        let query = format!(
            "UPDATE client_objects SET
                client_id = COALESCE($2, client_id),
                name = COALESCE($3, name),
                address = COALESCE($4, address),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                notes = COALESCE($7, notes)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClientObject>(&query)
            .bind(id)
            .bind(input.client_id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.notes)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Soft-delete a client object by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE client_objects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted client object. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE client_objects SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
