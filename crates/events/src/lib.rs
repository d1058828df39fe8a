//! Atrium change bus.
//!
//! This crate provides the in-process plumbing between API handlers that
//! mutate rows and the WebSocket layer that pushes those mutations to
//! subscribed clients:
//!
//! - [`ChangeBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`
//!   that stamps every event with a monotonic sequence number.
//! - [`ChangeEvent`]: the canonical row-change envelope.

pub mod bus;

pub use bus::{ChangeBus, ChangeEvent};
