//! Equipment (bins/containers) model and DTOs.

use fleet_core::placement::{Placement, PlacementRequest, PlacementSlot};
use fleet_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `equipment` table.
///
/// At most one of `transport_id`, `client_object_id`, `warehouse_id` is set.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Equipment {
    pub id: DbId,
    pub equipment_type: String,
    /// Capacity in cubic metres.
    pub volume: Option<f64>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub transport_id: Option<DbId>,
    pub client_object_id: Option<DbId>,
    pub warehouse_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Equipment {
    /// Current placement, or `None` when the unit is unplaced.
    pub fn placement(&self) -> Option<Placement> {
        match (self.transport_id, self.client_object_id, self.warehouse_id) {
            (Some(id), _, _) => Some(Placement::Transport(id)),
            (None, Some(id), _) => Some(Placement::ClientObject(id)),
            (None, None, Some(id)) => Some(Placement::Warehouse(id)),
            (None, None, None) => None,
        }
    }
}

/// DTO for creating a new equipment unit.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 128))]
    pub equipment_type: String,
    #[validate(range(min = 0.0))]
    pub volume: Option<f64>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub transport_id: Option<DbId>,
    pub client_object_id: Option<DbId>,
    pub warehouse_id: Option<DbId>,
}

impl CreateEquipment {
    pub fn placement_request(&self) -> PlacementRequest {
        PlacementRequest {
            transport_id: self.transport_id,
            client_object_id: self.client_object_id,
            warehouse_id: self.warehouse_id,
        }
    }
}

/// DTO for updating an equipment unit. All fields are optional.
///
/// Supplying one placement field relocates the unit there (clearing the
/// others); supplying none keeps the current placement.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 128))]
    pub equipment_type: Option<String>,
    #[validate(range(min = 0.0))]
    pub volume: Option<f64>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub transport_id: Option<DbId>,
    pub client_object_id: Option<DbId>,
    pub warehouse_id: Option<DbId>,
}

impl UpdateEquipment {
    pub fn placement_request(&self) -> PlacementRequest {
        PlacementRequest {
            transport_id: self.transport_id,
            client_object_id: self.client_object_id,
            warehouse_id: self.warehouse_id,
        }
    }
}

/// List filter for equipment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentFilter {
    pub equipment_type: Option<String>,
    /// Only units whose placement is in this slot.
    pub placed_in: Option<PlacementSlot>,
    /// Only units placed at this target id (combined with `placed_in`).
    pub placement_id: Option<DbId>,
    /// Only units with no placement at all.
    #[serde(default)]
    pub unplaced: bool,
}
