//! Order service: creation, editing, status transitions, transport
//! assignment and status-gated deletion.

use chrono::NaiveTime;
use fleet_core::entity::EntityKind;
use fleet_core::order::OrderStatus;
use fleet_core::pagination::{Page, PageRequest};
use fleet_core::types::DbId;
use fleet_db::models::order::{CreateOrder, Order, OrderFilter, UpdateOrder};
use fleet_db::repositories::{ClientObjectRepo, ClientRepo, OrderRepo, TransportRepo};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::{invalid, not_found, ServiceResult};
use crate::guard;

const KIND: EntityKind = EntityKind::Order;

pub struct OrderService;

impl OrderService {
    /// Create an order in `DRAFT` status.
    ///
    /// The client, the client object and the optional transport must be live,
    /// and the object must belong to the client.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> ServiceResult<Order> {
        input.validate()?;
        check_window(input.window_start, input.window_end)?;

        let mut tx = pool.begin().await?;
        lock_client_and_object(&mut tx, input.client_id, input.object_id).await?;
        if let Some(transport_id) = input.transport_id {
            lock_transport(&mut tx, transport_id).await?;
        }
        let order = OrderRepo::create(&mut tx, input).await?;
        tx.commit().await?;

        tracing::info!(
            entity = KIND.label(),
            id = order.id,
            object_id = order.object_id,
            status = %order.status,
            "Created"
        );
        Ok(order)
    }

    pub async fn get_by_id(pool: &PgPool, id: DbId, include_deleted: bool) -> ServiceResult<Order> {
        let mut conn = pool.acquire().await?;
        let found = if include_deleted {
            OrderRepo::find_by_id_include_deleted(&mut conn, id).await?
        } else {
            OrderRepo::find_by_id(&mut conn, id).await?
        };
        found.ok_or_else(|| not_found(KIND, id))
    }

    pub async fn list(
        pool: &PgPool,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> ServiceResult<Page<Order>> {
        let mut conn = pool.acquire().await?;
        Ok(OrderRepo::list(&mut conn, filter, page).await?)
    }

    /// Edit schedule, references or notes. The status is left untouched;
    /// orders in a terminal status cannot be edited.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateOrder) -> ServiceResult<Order> {
        input.validate()?;

        let mut tx = pool.begin().await?;
        let current = OrderRepo::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        if current.status.is_terminal() {
            return Err(invalid(format!(
                "order in {} status cannot be edited",
                current.status
            )));
        }
        check_window(
            input.window_start.or(current.window_start),
            input.window_end.or(current.window_end),
        )?;
        if input.client_id.is_some() || input.object_id.is_some() {
            lock_client_and_object(
                &mut tx,
                input.client_id.unwrap_or(current.client_id),
                input.object_id.unwrap_or(current.object_id),
            )
            .await?;
        }

        let order = OrderRepo::update(&mut tx, id, input)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, "Updated");
        Ok(order)
    }

    /// Move the order to `status` if the transition table allows it.
    pub async fn update_status(pool: &PgPool, id: DbId, status: OrderStatus) -> ServiceResult<Order> {
        let mut tx = pool.begin().await?;
        let current = OrderRepo::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        current.status.can_transition_to(status)?;

        let order = OrderRepo::update_status(&mut tx, id, status)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;

        tracing::info!(
            entity = KIND.label(),
            id,
            from = %current.status,
            to = %status,
            "Status changed"
        );
        Ok(order)
    }

    /// Set (`Some`) or clear (`None`) the transport. Does not change status.
    pub async fn assign_transport(
        pool: &PgPool,
        id: DbId,
        transport_id: Option<DbId>,
    ) -> ServiceResult<Order> {
        let mut tx = pool.begin().await?;
        OrderRepo::find_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        if let Some(transport_id) = transport_id {
            lock_transport(&mut tx, transport_id).await?;
        }
        let order = OrderRepo::assign_transport(&mut tx, id, transport_id)
            .await?
            .ok_or_else(|| not_found(KIND, id))?;
        tx.commit().await?;
        tracing::info!(entity = KIND.label(), id, transport_id = ?transport_id, "Assigned transport");
        Ok(order)
    }

    /// Soft-delete an order in `DRAFT` or `CANCELED` status.
    pub async fn delete(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        let mut tx = pool.begin().await?;
        if let Some(order) = OrderRepo::find_for_update(&mut tx, id).await? {
            order.status.can_be_deleted()?;
        }
        guard::delete_in(&mut tx, KIND, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn restore(pool: &PgPool, id: DbId) -> ServiceResult<()> {
        guard::restore(pool, KIND, id).await
    }
}

fn check_window(start: Option<NaiveTime>, end: Option<NaiveTime>) -> ServiceResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(invalid(format!(
            "window_start {start} must not be after window_end {end}"
        ))),
        _ => Ok(()),
    }
}

/// Share-lock the client and the object, and check the object belongs to
/// the client.
async fn lock_client_and_object(
    conn: &mut PgConnection,
    client_id: DbId,
    object_id: DbId,
) -> ServiceResult<()> {
    ClientRepo::find_for_share(&mut *conn, client_id)
        .await?
        .ok_or_else(|| not_found(EntityKind::Client, client_id))?;
    let object = ClientObjectRepo::find_for_share(&mut *conn, object_id)
        .await?
        .ok_or_else(|| not_found(EntityKind::ClientObject, object_id))?;
    if object.client_id != client_id {
        return Err(invalid(format!(
            "client object {object_id} does not belong to client {client_id}"
        )));
    }
    Ok(())
}

async fn lock_transport(conn: &mut PgConnection, transport_id: DbId) -> ServiceResult<()> {
    TransportRepo::find_for_share(conn, transport_id)
        .await?
        .ok_or_else(|| not_found(EntityKind::Transport, transport_id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use fleet_core::error::CoreError;

    use super::*;
    use crate::error::ServiceError;

    fn at(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn open_or_ordered_windows_pass() {
        assert!(check_window(None, None).is_ok());
        assert!(check_window(at(9, 0), None).is_ok());
        assert!(check_window(at(9, 0), at(9, 0)).is_ok());
        assert!(check_window(at(9, 0), at(17, 30)).is_ok());
    }

    #[test]
    fn reversed_window_is_rejected() {
        let err = check_window(at(14, 0), at(9, 0)).unwrap_err();
        assert_matches!(err, ServiceError::Core(CoreError::Validation(ref msg)) if msg.contains("14:00:00"));
    }
}
