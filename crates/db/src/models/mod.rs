//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - A `Deserialize` filter struct for list queries

pub mod client;
pub mod client_object;
pub mod driver;
pub mod equipment;
pub mod order;
pub mod transport;
pub mod warehouse;
