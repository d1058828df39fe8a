//! Row structs and insert/update payloads, one submodule per table.
//!
//! Entity structs derive `FromRow` and mirror their table's columns. Tables
//! that accept client patches (projects, profiles) also carry an all-`Option`
//! update DTO; append-only tables only have a create payload.

pub mod invoice;
pub mod message;
pub mod profile;
pub mod project;
pub mod session;
pub mod user;
