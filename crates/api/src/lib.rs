//! Library half of the Atrium API server.
//!
//! The binary entry point and the integration tests both build the app from
//! these modules, so everything from config to the WebSocket layer is public
//! here.

pub mod auth;
pub mod changes;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;
