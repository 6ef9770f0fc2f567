//! Fleet domain core.
//!
//! Pure lifecycle and referential-integrity rules for the waste-collection
//! fleet: order status transitions, equipment placement exclusivity, guarded
//! soft-deletion and the shared error taxonomy. Nothing in this crate talks
//! to a database directly; storage is reached through [`lifecycle::LifecycleStore`].

pub mod conflict;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod order;
pub mod pagination;
pub mod placement;
pub mod transport;
pub mod types;
