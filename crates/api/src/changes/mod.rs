//! Change-feed routing infrastructure.
//!
//! The [`ChangeRouter`] subscribes to the change bus and forwards each
//! event to the WebSocket connections subscribed to its scope.

pub mod router;

pub use router::ChangeRouter;
