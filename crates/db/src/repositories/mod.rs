//! Query layer: one zero-sized repo struct per table.
//!
//! Methods are free of business rules; they take `&PgPool`, run one
//! statement, and surface `sqlx::Error` untouched for the API layer to
//! classify.

pub mod invoice_repo;
pub mod message_repo;
pub mod profile_repo;
pub mod project_repo;
pub mod session_repo;
pub mod user_repo;

pub use invoice_repo::InvoiceRepo;
pub use message_repo::MessageRepo;
pub use profile_repo::ProfileRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
