//! Request handlers for the portal API.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the corresponding repository in `atrium_db` and map
//! errors via [`AppError`](crate::error::AppError). Write handlers publish a
//! change event to the bus after the row is committed.

pub mod auth;
pub mod invoice;
pub mod message;
pub mod profile;
pub mod project;
