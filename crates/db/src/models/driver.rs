//! Driver model and DTOs.

use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `drivers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Driver {
    pub id: DbId,
    pub full_name: String,
    pub phone: Option<String>,
    pub license_no: String,
    pub license_class: Option<String>,
    /// Storage path or URL of the driver's photo.
    pub photo: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new driver.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDriver {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub license_no: String,
    pub license_class: Option<String>,
    pub photo: Option<String>,
}

/// DTO for updating an existing driver. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDriver {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub license_no: Option<String>,
    pub license_class: Option<String>,
    pub photo: Option<String>,
}

/// List filter for drivers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverFilter {
    /// Case-insensitive substring match on `full_name` or `license_no`.
    pub search: Option<String>,
}
