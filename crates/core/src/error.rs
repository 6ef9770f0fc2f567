use crate::conflict::ConflictReport;
use crate::order::{format_statuses, OrderStatus};
use crate::placement::PlacementViolation;
use crate::types::DbId;

/// Domain error taxonomy.
///
/// Storage failures are deliberately absent: they travel separately so
/// callers can tell a rule violation from an infrastructure fault.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A guarded delete was blocked by active dependents.
    #[error("Conflict: {0}")]
    Conflict(Box<ConflictReport>),

    #[error(
        "Cannot transition order from {from} to {to}. Allowed next statuses: {}",
        format_statuses(.allowed)
    )]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        allowed: &'static [OrderStatus],
    },

    #[error("order in {status} status cannot be deleted")]
    OrderNotDeletable { status: OrderStatus },

    #[error("Invalid placement: {0}")]
    InvalidPlacement(PlacementViolation),

    #[error("{entity} with id {id} is already deleted")]
    AlreadyDeleted { entity: &'static str, id: DbId },

    #[error("{entity} with id {id} is not deleted")]
    NotDeleted { entity: &'static str, id: DbId },

    #[error("Duplicate {entity} {field}: '{value}' is already in use")]
    DuplicateKey {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    /// The conflict report, if this is a blocked guarded delete.
    pub fn conflict_report(&self) -> Option<&ConflictReport> {
        match self {
            CoreError::Conflict(report) => Some(report),
            _ => None,
        }
    }
}

impl From<ConflictReport> for CoreError {
    fn from(report: ConflictReport) -> Self {
        CoreError::Conflict(Box::new(report))
    }
}

/// A status string that does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} status '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownStatus {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
