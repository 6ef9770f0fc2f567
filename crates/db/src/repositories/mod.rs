//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&mut PgConnection` as the first argument, so callers can run
//! several calls inside one transaction (`&mut *tx`) or on a pooled
//! connection.

pub mod client_object_repo;
pub mod client_repo;
pub mod dependency_repo;
pub mod driver_repo;
pub mod equipment_repo;
pub mod order_repo;
pub mod transport_repo;
pub mod warehouse_repo;

pub use client_object_repo::ClientObjectRepo;
pub use client_repo::ClientRepo;
pub use dependency_repo::DependencyRepo;
pub use driver_repo::DriverRepo;
pub use equipment_repo::EquipmentRepo;
pub use order_repo::OrderRepo;
pub use transport_repo::TransportRepo;
pub use warehouse_repo::WarehouseRepo;
