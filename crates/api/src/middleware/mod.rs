//! Request extractors that gate handlers on identity and role.
//!
//! [`auth::AuthUser`] proves the caller holds a valid access token;
//! [`rbac::RequireAdmin`] additionally demands the admin role.

pub mod auth;
pub mod rbac;
