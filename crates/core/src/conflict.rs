//! Conflict reports for guarded soft-deletion.
//!
//! Each guarded entity kind has a fixed set of dependent categories that can
//! block its deletion. A dependent is "active" when its own `deleted_at` is
//! NULL and, for orders, its status is one of
//! [`ACTIVE_STATUSES`](crate::order::ACTIVE_STATUSES).

use std::fmt;

use serde::{Serialize, Serializer};

use crate::entity::EntityKind;
use crate::types::DbId;

/// A category of referencing rows that can block a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependent {
    Orders,
    Equipment,
    Drivers,
    Transports,
}

impl Dependent {
    /// Phrase used in the summary message.
    pub fn label(self) -> &'static str {
        match self {
            Dependent::Orders => "active orders",
            Dependent::Equipment => "active equipment",
            Dependent::Drivers => "active drivers",
            Dependent::Transports => "active transports",
        }
    }
}

/// The fixed guard table.
///
/// - ClientObject: active orders referencing it, equipment placed there.
/// - Warehouse: equipment placed there.
/// - Driver: non-deleted transports it currently drives.
/// - Equipment: non-deleted transports it is attached to. Equipment at a
///   client object or warehouse does not block.
/// - Transport: its current driver, attached equipment, active orders.
///
/// Clients and orders are not dependent-guarded.
pub fn guarded_dependents(kind: EntityKind) -> &'static [Dependent] {
    match kind {
        EntityKind::ClientObject => &[Dependent::Orders, Dependent::Equipment],
        EntityKind::Warehouse => &[Dependent::Equipment],
        EntityKind::Driver => &[Dependent::Transports],
        EntityKind::Equipment => &[Dependent::Transports],
        EntityKind::Transport => &[Dependent::Drivers, Dependent::Equipment, Dependent::Orders],
        EntityKind::Client | EntityKind::Order => &[],
    }
}

/// Result of a guarded-delete pre-check.
///
/// An empty report (no blocking ids in any category) means the delete is
/// permitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    pub entity: EntityKind,
    pub entity_id: DbId,
    pub active_orders: Vec<DbId>,
    pub active_equipment: Vec<DbId>,
    pub active_drivers: Vec<DbId>,
    pub active_transports: Vec<DbId>,
}

impl ConflictReport {
    pub fn new(entity: EntityKind, entity_id: DbId) -> Self {
        Self {
            entity,
            entity_id,
            active_orders: Vec::new(),
            active_equipment: Vec::new(),
            active_drivers: Vec::new(),
            active_transports: Vec::new(),
        }
    }

    /// Record the blocking ids for one category. Ids are sorted and deduplicated.
    pub fn record(&mut self, dependent: Dependent, mut ids: Vec<DbId>) {
        ids.sort_unstable();
        ids.dedup();
        *self.slot_mut(dependent) = ids;
    }

    pub fn ids(&self, dependent: Dependent) -> &[DbId] {
        match dependent {
            Dependent::Orders => &self.active_orders,
            Dependent::Equipment => &self.active_equipment,
            Dependent::Drivers => &self.active_drivers,
            Dependent::Transports => &self.active_transports,
        }
    }

    fn slot_mut(&mut self, dependent: Dependent) -> &mut Vec<DbId> {
        match dependent {
            Dependent::Orders => &mut self.active_orders,
            Dependent::Equipment => &mut self.active_equipment,
            Dependent::Drivers => &mut self.active_drivers,
            Dependent::Transports => &mut self.active_transports,
        }
    }

    pub fn has(&self, dependent: Dependent) -> bool {
        !self.ids(dependent).is_empty()
    }

    pub fn has_active_orders(&self) -> bool {
        self.has(Dependent::Orders)
    }

    pub fn has_active_equipment(&self) -> bool {
        self.has(Dependent::Equipment)
    }

    pub fn has_active_drivers(&self) -> bool {
        self.has(Dependent::Drivers)
    }

    pub fn has_active_transports(&self) -> bool {
        self.has(Dependent::Transports)
    }

    /// `true` when any category blocks the delete.
    pub fn is_blocked(&self) -> bool {
        self.has_active_orders()
            || self.has_active_equipment()
            || self.has_active_drivers()
            || self.has_active_transports()
    }

    /// Every blocking id, grouped by category in fixed order.
    pub fn blocking_ids(&self) -> Vec<(Dependent, DbId)> {
        [
            Dependent::Orders,
            Dependent::Equipment,
            Dependent::Drivers,
            Dependent::Transports,
        ]
        .into_iter()
        .flat_map(|dep| self.ids(dep).iter().map(move |id| (dep, *id)))
        .collect()
    }

    /// Per-category counts joined with commas, e.g.
    /// `has 2 active orders, has 1 active equipment`. Empty when not blocked.
    pub fn message(&self) -> String {
        [
            Dependent::Orders,
            Dependent::Equipment,
            Dependent::Drivers,
            Dependent::Transports,
        ]
        .into_iter()
        .filter(|dep| self.has(*dep))
        .map(|dep| format!("has {} {}", self.ids(dep).len(), dep.label()))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with id {} cannot be deleted: {}",
            self.entity,
            self.entity_id,
            self.message()
        )
    }
}

/// Wire shape: one boolean and one id list per category, plus the summary.
#[derive(Serialize)]
struct ConflictReportView<'a> {
    entity: EntityKind,
    entity_id: DbId,
    has_active_orders: bool,
    has_active_equipment: bool,
    has_active_drivers: bool,
    has_active_transports: bool,
    active_order_ids: &'a [DbId],
    active_equipment_ids: &'a [DbId],
    active_driver_ids: &'a [DbId],
    active_transport_ids: &'a [DbId],
    message: String,
}

impl Serialize for ConflictReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConflictReportView {
            entity: self.entity,
            entity_id: self.entity_id,
            has_active_orders: self.has_active_orders(),
            has_active_equipment: self.has_active_equipment(),
            has_active_drivers: self.has_active_drivers(),
            has_active_transports: self.has_active_transports(),
            active_order_ids: &self.active_orders,
            active_equipment_ids: &self.active_equipment,
            active_driver_ids: &self.active_drivers,
            active_transport_ids: &self.active_transports,
            message: self.message(),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_not_blocked() {
        let report = ConflictReport::new(EntityKind::Warehouse, 1);
        assert!(!report.is_blocked());
        assert!(report.blocking_ids().is_empty());
        assert_eq!(report.message(), "");
    }

    #[test]
    fn message_joins_category_counts() {
        let mut report = ConflictReport::new(EntityKind::ClientObject, 7);
        report.record(Dependent::Orders, vec![12, 11]);
        report.record(Dependent::Equipment, vec![3]);

        assert!(report.has_active_orders());
        assert!(report.has_active_equipment());
        assert!(!report.has_active_transports());
        assert_eq!(report.message(), "has 2 active orders, has 1 active equipment");
        assert_eq!(
            report.to_string(),
            "ClientObject with id 7 cannot be deleted: has 2 active orders, has 1 active equipment"
        );
    }

    #[test]
    fn record_sorts_and_dedups() {
        let mut report = ConflictReport::new(EntityKind::Equipment, 1);
        report.record(Dependent::Transports, vec![5, 2, 5]);
        assert_eq!(report.active_transports, vec![2, 5]);
        assert_eq!(
            report.blocking_ids(),
            vec![(Dependent::Transports, 2), (Dependent::Transports, 5)]
        );
    }

    #[test]
    fn guard_table_is_fixed() {
        assert_eq!(
            guarded_dependents(EntityKind::ClientObject),
            &[Dependent::Orders, Dependent::Equipment]
        );
        assert_eq!(guarded_dependents(EntityKind::Warehouse), &[Dependent::Equipment]);
        assert_eq!(guarded_dependents(EntityKind::Driver), &[Dependent::Transports]);
        assert_eq!(guarded_dependents(EntityKind::Equipment), &[Dependent::Transports]);
        assert_eq!(guarded_dependents(EntityKind::Transport).len(), 3);
        assert!(guarded_dependents(EntityKind::Client).is_empty());
        assert!(guarded_dependents(EntityKind::Order).is_empty());
    }

    #[test]
    fn serializes_flags_ids_and_message() {
        let mut report = ConflictReport::new(EntityKind::Driver, 4);
        report.record(Dependent::Transports, vec![9]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entity"], "driver");
        assert_eq!(json["has_active_transports"], true);
        assert_eq!(json["has_active_orders"], false);
        assert_eq!(json["active_transport_ids"], serde_json::json!([9]));
        assert_eq!(json["message"], "has 1 active transports");
    }
}
