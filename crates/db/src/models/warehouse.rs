//! Warehouse model and DTOs.

use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `warehouses` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Warehouse {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWarehouse {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWarehouse {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseFilter {
    pub search: Option<String>,
}
