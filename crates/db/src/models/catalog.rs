//! Entity catalog models: projects, proposals, contacts, and aliases.
//!
//! The catalog is owned by the wider platform; the suggestion engine only
//! needs lookups and existence checks, plus creation for collaborator
//! seeding.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub project_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub code: String,
    pub name: String,
}

/// DTO for creating a proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProposal {
    pub code: String,
    pub name: String,
    pub project_id: Option<DbId>,
}

/// DTO for creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContact {
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
}
