//! Transport (vehicle) model and DTOs.

use fleet_core::transport::TransportStatus;
use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `transports` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Transport {
    pub id: DbId,
    pub plate_no: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Payload capacity in cubic metres.
    pub capacity: Option<f64>,
    #[sqlx(try_from = "String")]
    pub status: TransportStatus,
    pub current_driver_id: Option<DbId>,
    pub current_equipment_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new transport.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTransport {
    #[validate(length(min = 1, max = 32))]
    pub plate_no: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 0.0))]
    pub capacity: Option<f64>,
    /// Defaults to `IN_WORK`.
    pub status: Option<TransportStatus>,
    pub current_driver_id: Option<DbId>,
    pub current_equipment_id: Option<DbId>,
}

/// DTO for updating a transport. Driver and equipment are changed through
/// their dedicated assign operations.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransport {
    #[validate(length(min = 1, max = 32))]
    pub plate_no: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 0.0))]
    pub capacity: Option<f64>,
    pub status: Option<TransportStatus>,
}

/// List filter for transports.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransportFilter {
    pub status: Option<TransportStatus>,
    /// Case-insensitive substring match on `plate_no`.
    pub search: Option<String>,
}
