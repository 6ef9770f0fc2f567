//! Domain services for the fleet back office.
//!
//! Each service is a zero-sized struct whose operations take a `&PgPool`.
//! Mutations run in a single transaction: inputs are validated first, then
//! referenced rows are share-locked, then the repository write happens.
//! Deletes go through the guarded lifecycle manager in `fleet_core`.

pub mod client;
pub mod client_object;
pub mod driver;
pub mod equipment;
pub mod error;
mod guard;
pub mod order;
pub mod transport;
pub mod warehouse;

pub use client::ClientService;
pub use client_object::ClientObjectService;
pub use driver::DriverService;
pub use equipment::EquipmentService;
pub use error::{ServiceError, ServiceResult};
pub use order::OrderService;
pub use transport::TransportService;
pub use warehouse::WarehouseService;
