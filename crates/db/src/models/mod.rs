//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts (validated with `validator`)
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod brand;
pub mod campaign;
pub mod category;
pub mod coupon;
pub mod customer;
pub mod dashboard;
pub mod inventory;
pub mod order;
pub mod product;
pub mod session;
pub mod setting;
pub mod user;
