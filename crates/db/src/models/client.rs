//! Client entity model and DTOs.

use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `clients` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClient {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// DTO for updating an existing client. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClient {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// List filter for clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientFilter {
    /// Case-insensitive substring match on `name`.
    pub search: Option<String>,
}
