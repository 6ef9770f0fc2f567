//! Client object (collection site) model and DTOs.

use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `client_objects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ClientObject {
    pub id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new client object.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientObject {
    pub client_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// DTO for updating an existing client object. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClientObject {
    pub client_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// List filter for client objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientObjectFilter {
    pub client_id: Option<DbId>,
    /// Case-insensitive substring match on `name` or `address`.
    pub search: Option<String>,
}
