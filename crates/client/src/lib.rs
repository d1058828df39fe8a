//! Client library for the Atrium portal backend.
//!
//! Implements the portal flow as composable stages over an injected
//! [`PortalBackend`]:
//!
//! - [`session::SessionGate`] resolves the signed-in identity to exactly one
//!   portal state;
//! - [`conversation::ConversationView`] renders the project conversation
//!   with optimistic writes and realtime merge;
//! - [`progress::ProjectSync`] keeps a single project record current from
//!   pushed updates;
//! - [`subscriber::ChangeSubscriber`] maintains the live sync channel with
//!   reconnect and backoff.
//!
//! [`http::HttpBackend`] is the production transport; tests inject an
//! in-memory backend instead.

pub mod backend;
pub mod conversation;
pub mod error;
pub mod http;
pub mod progress;
pub mod session;
pub mod subscriber;

pub use backend::{
    InvoiceRecord, PortalBackend, ProjectPatch, ProjectRecord, SessionUser, SignupInput,
};
pub use conversation::ConversationView;
pub use error::ClientError;
pub use http::HttpBackend;
pub use progress::{progress_patch, ProjectSync};
pub use session::{GateState, SelectionPolicy, SessionGate, ACCESS_DENIED};
pub use subscriber::{BackoffConfig, ChangeSubscriber, SubscriptionHandle};
