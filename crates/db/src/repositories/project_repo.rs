//! Repository for the `projects` table.

use sqlx::PgPool;

use atrium_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Select list every query in this repo shares.
const COLUMNS: &str = "id, name, client_name, client_email, plan, status, progress, health, \
                        next_milestone, lead_name, lead_email, budget, tech_stack, \
                        created_at, updated_at";

/// CRUD plus the scoped lookups handlers build authorization on.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// `plan` and `status` fall back to the column defaults (`'MVP'`,
    /// `'pending'`) when `None` in the input.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, client_name, client_email, plan, status, lead_name, lead_email,
                 budget, tech_stack)
             VALUES ($1, $2, $3, COALESCE($4, 'MVP'), COALESCE($5, 'pending'), $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(&input.lead_name)
            .bind(&input.lead_email)
            .bind(&input.budget)
            .bind(&input.tech_stack)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// List the projects linked to a client email, most recently created
    /// first.
    ///
    /// This is the client portal's entity fetch: zero rows is a normal state
    /// the caller renders, more than one is resolved by the caller's
    /// selection policy.
    pub async fn list_by_client_email(
        pool: &PgPool,
        client_email: &str,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE client_email = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(client_email)
            .fetch_all(pool)
            .await
    }

    /// Apply a patch; `None` fields keep their stored values.
    ///
    /// Last write wins: there is no concurrency token, so two simultaneous
    /// updates to the same field resolve to whichever lands second.
    /// Yields `None` when the project does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                client_name = COALESCE($3, client_name),
                plan = COALESCE($4, plan),
                status = COALESCE($5, status),
                progress = COALESCE($6, progress),
                health = COALESCE($7, health),
                next_milestone = COALESCE($8, next_milestone),
                lead_name = COALESCE($9, lead_name),
                lead_email = COALESCE($10, lead_email),
                budget = COALESCE($11, budget),
                tech_stack = COALESCE($12, tech_stack)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.client_name)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(input.progress)
            .bind(&input.health)
            .bind(&input.next_milestone)
            .bind(&input.lead_name)
            .bind(&input.lead_email)
            .bind(&input.budget)
            .bind(&input.tech_stack)
            .fetch_optional(pool)
            .await
    }
}
