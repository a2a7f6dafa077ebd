//! Detector draft types and ingestion-boundary validation.
//!
//! The detector is an external collaborator producing loosely-typed JSON.
//! Its payloads are deserialized into [`DetectorDraft`] and validated here
//! before anything touches the store: malformed drafts are quarantined with
//! the reason, never persisted half-formed. Well-formed siblings in the same
//! batch are unaffected.

use serde::{Deserialize, Serialize};

use crate::confidence::validate_confidence;
use crate::error::CoreError;
use crate::suggestion::{self, TYPE_CATEGORIZATION};
use crate::types::DbId;

/// Structured justification attached to a suggestion by the detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    pub summary: String,
    #[serde(default)]
    pub detected_projects: Vec<String>,
    #[serde(default)]
    pub detected_fees: Vec<String>,
    #[serde(default)]
    pub detected_contacts: Vec<String>,
    #[serde(default)]
    pub detected_dates: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A declarative, optionally-selectable mutation proposed by the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub id: String,
    pub action_type: String,
    pub description: String,
    /// Human-readable statement of the database change, e.g.
    /// `"link email 4821 to project 25 BK-017"`.
    pub database_change: String,
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
}

fn default_true() -> bool {
    true
}

/// The entity a draft proposes to link to, when it proposes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetCandidate {
    pub entity_type: String,
    pub entity_id: DbId,
}

/// One detector output item, pre-validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorDraft {
    pub suggestion_type: String,
    pub target_candidate: Option<TargetCandidate>,
    pub confidence_score: f64,
    pub evidence: Evidence,
    #[serde(default)]
    pub suggested_actions: Vec<SuggestedAction>,
}

impl DetectorDraft {
    /// Validate the draft at the ingestion boundary.
    ///
    /// Checks: known suggestion type, confidence within [0, 1], link-style
    /// drafts carry a target whose entity type matches the suggestion type,
    /// non-empty evidence summary, and unique non-empty action ids.
    pub fn validate(&self) -> Result<(), CoreError> {
        suggestion::validate_suggestion_type(&self.suggestion_type)?;
        validate_confidence(self.confidence_score)?;

        let expected_target = suggestion::target_entity_type(&self.suggestion_type);
        match (&self.target_candidate, expected_target) {
            (Some(t), Some(expected)) if t.entity_type != expected => {
                return Err(CoreError::Validation(format!(
                    "Suggestion type '{}' expects a '{expected}' target, got '{}'",
                    self.suggestion_type, t.entity_type
                )));
            }
            (None, Some(expected)) if self.suggestion_type != suggestion::TYPE_NEW_CONTACT => {
                return Err(CoreError::Validation(format!(
                    "Suggestion type '{}' requires a '{expected}' target candidate",
                    self.suggestion_type
                )));
            }
            _ => {}
        }

        if self.evidence.summary.trim().is_empty() {
            return Err(CoreError::Validation(
                "Evidence summary must not be empty".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(self.suggested_actions.len());
        for action in &self.suggested_actions {
            if action.id.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Suggested action id must not be empty".to_string(),
                ));
            }
            if seen.contains(&&action.id) {
                return Err(CoreError::Validation(format!(
                    "Duplicate suggested action id '{}'",
                    action.id
                )));
            }
            seen.push(&action.id);
        }

        Ok(())
    }

    /// Build the degraded draft used when the detector itself fails.
    ///
    /// Ingestion must not block on detector errors: the failure becomes a
    /// low-confidence, minimal-evidence categorization suggestion that a
    /// reviewer will see and resolve by hand.
    pub fn degraded(failure: &str) -> Self {
        Self {
            suggestion_type: TYPE_CATEGORIZATION.to_string(),
            target_candidate: None,
            confidence_score: 0.05,
            evidence: Evidence {
                summary: format!("Detector failed; manual review required: {failure}"),
                ..Evidence::default()
            },
            suggested_actions: Vec::new(),
        }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
