//! Repository for the `orders` table.

use fleet_core::order::OrderStatus;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use sqlx::PgConnection;

use crate::models::order::{CreateOrder, Order, OrderFilter, UpdateOrder};

const COLUMNS: &str = "id, client_id, object_id, scheduled_date, window_start, window_end, \
                       status, transport_id, notes, created_by, \
                       deleted_at, created_at, updated_at";

/// `$1` = include_deleted, `$2` = status, `$3` = client_id, `$4` = object_id,
/// `$5` = transport_id.
const LIST_FILTER: &str = "($1::BOOLEAN OR deleted_at IS NULL) \
     AND ($2::TEXT IS NULL OR status = $2) \
     AND ($3::BIGINT IS NULL OR client_id = $3) \
     AND ($4::BIGINT IS NULL OR object_id = $4) \
     AND ($5::BIGINT IS NULL OR transport_id = $5)";

/// Provides CRUD and status operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new order in `DRAFT` status.
    pub async fn create(conn: &mut PgConnection, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders
                (client_id, object_id, scheduled_date, window_start, window_end,
                 status, transport_id, notes, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(input.client_id)
            .bind(input.object_id)
            .bind(input.scheduled_date)
            .bind(input.window_start)
            .bind(input.window_end)
            .bind(OrderStatus::Draft.as_str())
            .bind(input.transport_id)
            .bind(&input.notes)
            .bind(input.created_by)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an order by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find an order by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find a live order and lock it so its status cannot change underneath
    /// the caller.
    pub async fn find_for_update(conn: &mut PgConnection, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List orders, most recently scheduled first.
    pub async fn list(
        conn: &mut PgConnection,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, sqlx::Error> {
        let status = filter.status.map(|s| s.as_str());
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE {LIST_FILTER}
             ORDER BY scheduled_date DESC, id DESC LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, Order>(&query)
            .bind(page.include_deleted)
            .bind(status)
            .bind(filter.client_id)
            .bind(filter.object_id)
            .bind(filter.transport_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        let count = format!("SELECT COUNT(*) FROM orders WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count)
            .bind(page.include_deleted)
            .bind(status)
            .bind(filter.client_id)
            .bind(filter.object_id)
            .bind(filter.transport_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total, page))
    }

    /// Update an order's schedule, references and notes. Never touches status.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                client_id = COALESCE($2, client_id),
                object_id = COALESCE($3, object_id),
                scheduled_date = COALESCE($4, scheduled_date),
                window_start = COALESCE($5, window_start),
                window_end = COALESCE($6, window_end),
                notes = COALESCE($7, notes)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(input.client_id)
            .bind(input.object_id)
            .bind(input.scheduled_date)
            .bind(input.window_start)
            .bind(input.window_end)
            .bind(&input.notes)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Write a new status. Transition legality is checked by the caller.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET status = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Set or clear the assigned transport.
    pub async fn assign_transport(
        conn: &mut PgConnection,
        id: DbId,
        transport_id: Option<DbId>,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET transport_id = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(transport_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Soft-delete an order by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted order. Returns `true` if a row was restored.
    pub async fn restore(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
