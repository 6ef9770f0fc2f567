//! Entity kinds known to the lifecycle engine.

use std::fmt;

use serde::Serialize;

/// Every soft-deletable entity in the fleet domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    ClientObject,
    Equipment,
    Transport,
    Driver,
    Warehouse,
    Order,
}

impl EntityKind {
    /// All kinds, in dependency order (referenced kinds first).
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Client,
        EntityKind::ClientObject,
        EntityKind::Warehouse,
        EntityKind::Driver,
        EntityKind::Equipment,
        EntityKind::Transport,
        EntityKind::Order,
    ];

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::ClientObject => "ClientObject",
            EntityKind::Equipment => "Equipment",
            EntityKind::Transport => "Transport",
            EntityKind::Driver => "Driver",
            EntityKind::Warehouse => "Warehouse",
            EntityKind::Order => "Order",
        }
    }

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::ClientObject => "client_objects",
            EntityKind::Equipment => "equipment",
            EntityKind::Transport => "transports",
            EntityKind::Driver => "drivers",
            EntityKind::Warehouse => "warehouses",
            EntityKind::Order => "orders",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
