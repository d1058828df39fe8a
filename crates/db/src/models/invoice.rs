//! Invoice entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atrium_core::types::{DbId, Timestamp};

/// An invoice row from the `invoices` table.
///
/// `amount` is the formatted display string (e.g. `"$12,500.00"`); invoices
/// are records of billing done elsewhere, not an accounting ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub amount: String,
    pub status: String,
    pub date: NaiveDate,
    pub created_at: Timestamp,
}

/// DTO for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoice {
    pub description: String,
    pub amount: String,
    pub status: Option<String>,
    pub date: NaiveDate,
}
