//! Equipment placement exclusivity.
//!
//! An equipment unit sits in at most one of {transport, client object,
//! warehouse} at a time. Validation is pure and runs on the request payload
//! before any write.
//!
//! For updates, a payload with no placement field keeps the current
//! placement; it never means "clear placement".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum number of placement references an equipment unit may carry.
pub const MAX_PLACEMENTS: usize = 1;

/// One of the three locations an equipment unit can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementSlot {
    Transport,
    ClientObject,
    Warehouse,
}

impl PlacementSlot {
    /// Wire / query representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PlacementSlot::Transport => "transport",
            PlacementSlot::ClientObject => "client_object",
            PlacementSlot::Warehouse => "warehouse",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlacementSlot::Transport => "transport",
            PlacementSlot::ClientObject => "client object",
            PlacementSlot::Warehouse => "warehouse",
        }
    }
}

/// A resolved, single placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Placement {
    Transport(DbId),
    ClientObject(DbId),
    Warehouse(DbId),
}

impl Placement {
    pub fn slot(self) -> PlacementSlot {
        match self {
            Placement::Transport(_) => PlacementSlot::Transport,
            Placement::ClientObject(_) => PlacementSlot::ClientObject,
            Placement::Warehouse(_) => PlacementSlot::Warehouse,
        }
    }

    pub fn target_id(self) -> DbId {
        match self {
            Placement::Transport(id) | Placement::ClientObject(id) | Placement::Warehouse(id) => id,
        }
    }

    /// Column triple `(transport_id, client_object_id, warehouse_id)`.
    ///
    /// Exactly one element is `Some`, so writing the triple clears the other
    /// two slots.
    pub fn columns(self) -> PlacementRequest {
        match self {
            Placement::Transport(id) => PlacementRequest {
                transport_id: Some(id),
                ..PlacementRequest::default()
            },
            Placement::ClientObject(id) => PlacementRequest {
                client_object_id: Some(id),
                ..PlacementRequest::default()
            },
            Placement::Warehouse(id) => PlacementRequest {
                warehouse_id: Some(id),
                ..PlacementRequest::default()
            },
        }
    }
}

/// The placement fields of a create or update payload, as supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementRequest {
    pub transport_id: Option<DbId>,
    pub client_object_id: Option<DbId>,
    pub warehouse_id: Option<DbId>,
}

impl PlacementRequest {
    /// Slots that carry a value, in fixed order.
    pub fn supplied(&self) -> Vec<PlacementSlot> {
        [
            (self.transport_id, PlacementSlot::Transport),
            (self.client_object_id, PlacementSlot::ClientObject),
            (self.warehouse_id, PlacementSlot::Warehouse),
        ]
        .into_iter()
        .filter_map(|(id, slot)| id.map(|_| slot))
        .collect()
    }

    /// Validate exclusivity and resolve the payload.
    ///
    /// Returns `Ok(None)` when no placement field is set. On create that means
    /// the unit is unplaced; on update it means the placement is unchanged.
    pub fn validate(&self) -> Result<Option<Placement>, CoreError> {
        let supplied = self.supplied();
        if supplied.len() > MAX_PLACEMENTS {
            return Err(CoreError::InvalidPlacement(PlacementViolation { slots: supplied }));
        }
        Ok(match (self.transport_id, self.client_object_id, self.warehouse_id) {
            (Some(id), None, None) => Some(Placement::Transport(id)),
            (None, Some(id), None) => Some(Placement::ClientObject(id)),
            (None, None, Some(id)) => Some(Placement::Warehouse(id)),
            _ => None,
        })
    }
}

/// The disallowed combination of placement slots found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementViolation {
    pub slots: Vec<PlacementSlot>,
}

impl fmt::Display for PlacementViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.slots.iter().map(|s| s.label()).collect();
        write!(
            f,
            "equipment cannot be placed in {} at the same time",
            names.join(" and ")
        )
    }
}
