//! Suggestion models and DTOs.
//!
//! Maps to the `suggestions` table. The `evidence` and `suggested_actions`
//! JSONB columns round-trip through the typed structs in
//! `atelier_core::detector`.

use atelier_core::detector::{Evidence, SuggestedAction};
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `suggestions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Suggestion {
    pub id: DbId,
    pub suggestion_type: String,
    pub source_type: String,
    pub source_id: DbId,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub confidence: f64,
    pub evidence: Json<Evidence>,
    pub suggested_actions: Json<Vec<SuggestedAction>>,
    pub status: String,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewer_notes: Option<String>,
    pub error_note: Option<String>,
    pub last_skipped_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Suggestion {
    /// Whether this row was inserted (rather than updated in place) by the
    /// most recent upsert. Insert defaults set both stamps from the same
    /// statement clock; any later update moves `updated_at` forward.
    pub fn freshly_created(&self) -> bool {
        self.created_at == self.updated_at
    }
}

/// DTO for persisting a validated detector draft.
#[derive(Debug, Clone)]
pub struct NewSuggestion {
    pub suggestion_type: String,
    pub source_type: String,
    pub source_id: DbId,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub confidence: f64,
    pub evidence: Evidence,
    pub suggested_actions: Vec<SuggestedAction>,
}

/// Query parameters for listing the pending review queue.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionListParams {
    pub suggestion_type: Option<String>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    pub limit: Option<i64>,
    /// Opaque keyset cursor from a previous page's last item.
    pub after: Option<String>,
}
