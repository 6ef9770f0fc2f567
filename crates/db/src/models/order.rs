//! Collection order model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use fleet_core::order::OrderStatus;
use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `orders` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub client_id: DbId,
    pub object_id: DbId,
    pub scheduled_date: NaiveDate,
    pub window_start: Option<NaiveTime>,
    pub window_end: Option<NaiveTime>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub transport_id: Option<DbId>,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new order. The status is always `DRAFT` on creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrder {
    pub client_id: DbId,
    pub object_id: DbId,
    pub scheduled_date: NaiveDate,
    pub window_start: Option<NaiveTime>,
    pub window_end: Option<NaiveTime>,
    pub transport_id: Option<DbId>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
}

/// DTO for editing an order. Status and transport have dedicated operations.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrder {
    pub client_id: Option<DbId>,
    pub object_id: Option<DbId>,
    pub scheduled_date: Option<NaiveDate>,
    pub window_start: Option<NaiveTime>,
    pub window_end: Option<NaiveTime>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

/// List filter for orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub client_id: Option<DbId>,
    pub object_id: Option<DbId>,
    pub transport_id: Option<DbId>,
}
