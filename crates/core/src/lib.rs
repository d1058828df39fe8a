//! Shared domain logic for the Atrium portal.
//!
//! This crate has zero internal dependencies so the API layer, the client
//! library, and any future tooling can all reference the same types, error
//! taxonomy, constants, and validation rules.

pub mod conversation;
pub mod error;
pub mod progress;
pub mod roles;
pub mod status;
pub mod sync;
pub mod tags;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
