//! Repository for the `clients` table.

use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::client::{Client, ClientFilter, CreateClient, UpdateClient};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, tax_id, email, phone, notes, deleted_at, created_at, updated_at";

/// `WHERE` clause for list/count. `$1` = include_deleted, `$2` = search.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a new client, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (name, tax_id, email, phone, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&input.name)
            .bind(&input.tax_id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.notes)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a client by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a client by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live client and hold a shared lock on it until the transaction
    /// ends, so it cannot be deleted while a reference to it is written.
    pub async fn find_for_share(conn: &mut PgConnection, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients WHERE id = $1 AND deleted_at IS NULL FOR SHARE"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List clients, newest first.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &ClientFilter,
        page: &PageRequest,
    ) -> Result<Page<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Client>(&query)
            .bind(page.include_deleted)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM clients WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(&filter.search)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update a client. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($2, name),
                tax_id = COALESCE($3, tax_id),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                notes = COALESCE($6, notes)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.tax_id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.notes)
            .fetch_optional(&mut *conn)
            .await
    }

    /// `true` if a live client other than `exclude_id` already uses `name`.
    pub async fn exists_by_name(
        conn: &mut PgConnection,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM clients
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

    /// Soft-delete a client by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE clients SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted client. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE clients SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
