//! Correction models: what a reviewer determined was actually correct when
//! rejecting a suggestion. 1:1 with rejected suggestions; targets are a
//! join table because one source document can relate to several entities.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `corrections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Correction {
    pub id: DbId,
    pub suggestion_id: DbId,
    pub rejection_reason: String,
    pub notes: Option<String>,
    pub created_pattern_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A row from the `correction_targets` join table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CorrectionTarget {
    pub id: DbId,
    pub correction_id: DbId,
    pub target_type: String,
    pub target_id: DbId,
}

/// A corrected target reference as supplied by the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRef {
    pub target_type: String,
    pub target_id: DbId,
}

/// A correction with its targets, as returned to collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionWithTargets {
    #[serde(flatten)]
    pub correction: Correction,
    pub targets: Vec<CorrectionTarget>,
}
