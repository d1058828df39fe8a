//! Project status and health constants.
//!
//! These must match the CHECK constraints in
//! `20260815000005_create_projects_table.sql`.

// ---------------------------------------------------------------------------
// Project status
// ---------------------------------------------------------------------------

/// Known project lifecycle statuses.
pub mod statuses {
    /// Created but not yet kicked off.
    pub const PENDING: &str = "pending";
    /// Actively being built.
    pub const ACTIVE: &str = "active";
    /// Delivered, under a maintenance agreement.
    pub const MAINTENANCE: &str = "maintenance";
}

/// The set of all valid project statuses.
pub const VALID_STATUSES: &[&str] = &[
    statuses::PENDING,
    statuses::ACTIVE,
    statuses::MAINTENANCE,
];

/// Returns `true` if the given status is valid.
pub fn is_valid_status(status: &str) -> bool {
    VALID_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Project health
// ---------------------------------------------------------------------------

/// Known project health indicators.
pub mod health {
    pub const HEALTHY: &str = "healthy";
    pub const WARNING: &str = "warning";
    pub const CRITICAL: &str = "critical";
}

/// The set of all valid project health values.
pub const VALID_HEALTH: &[&str] = &[
    health::HEALTHY,
    health::WARNING,
    health::CRITICAL,
];

/// Returns `true` if the given health value is valid.
pub fn is_valid_health(value: &str) -> bool {
    VALID_HEALTH.contains(&value)
}

// ---------------------------------------------------------------------------
// Invoice status
// ---------------------------------------------------------------------------

/// Known invoice statuses.
pub mod invoice_statuses {
    pub const PAID: &str = "paid";
    pub const PENDING: &str = "pending";
}

/// The set of all valid invoice statuses.
pub const VALID_INVOICE_STATUSES: &[&str] =
    &[invoice_statuses::PAID, invoice_statuses::PENDING];

/// Returns `true` if the given invoice status is valid.
pub fn is_valid_invoice_status(status: &str) -> bool {
    VALID_INVOICE_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
