//! Repository for the `invoices` table.

use sqlx::PgPool;

use atrium_core::types::DbId;

use crate::models::invoice::{CreateInvoice, Invoice};

/// Select list every query in this repo shares.
const COLUMNS: &str = "id, project_id, description, amount, status, date, created_at";

/// Provides CRUD operations for invoices.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a new invoice, returning the created row.
    ///
    /// `status` falls back to the column default (`'pending'`) when `None`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateInvoice,
    ) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices (project_id, description, amount, status, date)
             VALUES ($1, $2, $3, COALESCE($4, 'pending'), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(project_id)
            .bind(&input.description)
            .bind(&input.amount)
            .bind(&input.status)
            .bind(input.date)
            .fetch_one(pool)
            .await
    }

    /// List all invoices for a project, newest billing date first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE project_id = $1
             ORDER BY date DESC, id DESC"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
