//! Pure domain logic for the back-office service.
//!
//! Nothing in this crate touches the database or HTTP. Handlers in
//! `backoffice-api` call into these modules for authorization decisions,
//! pricing, coupon evaluation and stock arithmetic.

pub mod campaigns;
pub mod coupons;
pub mod error;
pub mod inventory;
pub mod orders;
pub mod pagination;
pub mod permissions;
pub mod pricing;
pub mod roles;
pub mod slug;
pub mod types;
pub mod validation;
