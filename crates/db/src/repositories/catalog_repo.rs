//! Repository for the entity catalog (projects, proposals, contacts).
//!
//! The catalog belongs to the wider platform; the engine needs creation for
//! collaborator seeding plus existence checks when applying mutations.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::{
    Contact, CreateContact, CreateProject, CreateProposal, Project, Proposal,
};

const PROJECT_COLUMNS: &str = "id, code, name, created_at, updated_at";
const PROPOSAL_COLUMNS: &str = "id, code, name, project_id, created_at, updated_at";
const CONTACT_COLUMNS: &str = "id, name, email, company, created_at, updated_at";

/// Provides catalog operations.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Create a project.
    pub async fn create_project(
        pool: &PgPool,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (code, name) VALUES ($1, $2) RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Create a proposal.
    pub async fn create_proposal(
        pool: &PgPool,
        input: &CreateProposal,
    ) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals (code, name, project_id)
             VALUES ($1, $2, $3)
             RETURNING {PROPOSAL_COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.project_id)
            .fetch_one(pool)
            .await
    }

    /// Create a contact.
    pub async fn create_contact(
        pool: &PgPool,
        input: &CreateContact,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (name, email, company)
             VALUES ($1, $2, $3)
             RETURNING {CONTACT_COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.company)
            .fetch_one(pool)
            .await
    }

    /// Insert a contact inside the caller's transaction. Used by the apply
    /// step when realizing a `new_contact` suggestion.
    pub async fn create_contact_in_tx(
        conn: &mut sqlx::PgConnection,
        name: &str,
        email: Option<&str>,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (name, email) VALUES ($1, $2) RETURNING {CONTACT_COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(name)
            .bind(email)
            .fetch_one(conn)
            .await
    }

    /// Find a project by its primary key.
    pub async fn find_project_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a catalog entity of the given type and id exists.
    ///
    /// Used by the mutation preview to fail an apply before it starts when
    /// the target entity is missing. Unknown entity types report `false`.
    pub async fn entity_exists(
        conn: &mut sqlx::PgConnection,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = match entity_type {
            "project" => "SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)",
            "proposal" => "SELECT EXISTS (SELECT 1 FROM proposals WHERE id = $1)",
            "contact" => "SELECT EXISTS (SELECT 1 FROM contacts WHERE id = $1)",
            _ => return Ok(false),
        };
        sqlx::query_scalar::<_, bool>(query)
            .bind(entity_id)
            .fetch_one(conn)
            .await
    }
}
