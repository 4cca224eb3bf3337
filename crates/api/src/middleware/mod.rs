//! Authentication and authorization middleware.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, from a Bearer token or session cookie.
//! - [`session::require_session`] -- layer that rejects unauthenticated requests.
//! - [`rbac`] -- permission checks on [`auth::AuthUser`].

pub mod auth;
pub mod rbac;
pub mod session;
