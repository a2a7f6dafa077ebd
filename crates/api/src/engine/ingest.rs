//! Detector ingestion: batch intake of drafts against one source document.
//!
//! Each draft is validated in isolation. A malformed item is quarantined
//! with its index and reason while its siblings proceed, and a reported
//! detector failure is converted into one low-confidence degraded draft so
//! the document still surfaces for manual review.
//!
//! Re-running the detector over the same document is idempotent: a draft
//! that matches a pending suggestion's identity refreshes that row in
//! place instead of inserting a duplicate.

use atelier_core::detector::DetectorDraft;
use atelier_core::domains::InternalDomains;
use atelier_core::error::CoreError;
use atelier_core::pattern::{PATTERN_TYPE_SENDER_DOMAIN, PATTERN_TYPE_SENDER_EMAIL};
use atelier_core::sender;
use atelier_core::types::DbId;
use atelier_db::models::document::SourceDocument;
use atelier_db::models::pattern::Pattern;
use atelier_db::models::suggestion::{NewSuggestion, Suggestion};
use atelier_db::repositories::{PatternRepo, SuggestionRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::engine::decision::{self, ApproveRequest};
use crate::error::AppResult;

/// One detector batch for a single source document.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Raw detector items; each is validated independently.
    #[serde(default)]
    pub drafts: Vec<serde_json::Value>,
    /// Set when the detector itself failed on this document. Produces one
    /// degraded low-confidence suggestion in place of real drafts.
    pub failure: Option<String>,
}

/// A draft that failed validation, reported back with its batch position.
#[derive(Debug, Serialize)]
pub struct QuarantinedDraft {
    pub index: usize,
    pub error: String,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    pub created: Vec<Suggestion>,
    pub updated: Vec<Suggestion>,
    /// Suggestion ids resolved without review by an auto-apply pattern.
    pub auto_applied: Vec<DbId>,
    pub quarantined: Vec<QuarantinedDraft>,
}

/// Ingest a detector batch against `document`.
pub async fn ingest(
    pool: &PgPool,
    internal: &InternalDomains,
    auto_apply_enabled: bool,
    document: &SourceDocument,
    req: &IngestRequest,
) -> AppResult<IngestReport> {
    let mut report = IngestReport::default();

    let mut drafts: Vec<DetectorDraft> = Vec::with_capacity(req.drafts.len());
    for (index, raw) in req.drafts.iter().enumerate() {
        let parsed: Result<DetectorDraft, CoreError> =
            serde_json::from_value(raw.clone()).map_err(|e| {
                CoreError::Validation(format!("Malformed detector draft: {e}"))
            });
        match parsed.and_then(|d| d.validate().map(|_| d)) {
            Ok(draft) => drafts.push(draft),
            Err(err) => {
                tracing::warn!(
                    document_id = document.id,
                    index,
                    error = %err,
                    "Detector draft quarantined",
                );
                report.quarantined.push(QuarantinedDraft {
                    index,
                    error: err.to_string(),
                });
            }
        }
    }

    if let Some(failure) = &req.failure {
        tracing::warn!(
            document_id = document.id,
            failure = %failure,
            "Detector reported a failure; emitting degraded suggestion",
        );
        drafts.push(DetectorDraft::degraded(failure));
    }

    let auto_pattern = if auto_apply_enabled {
        find_auto_apply_pattern(pool, internal, document).await?
    } else {
        None
    };

    for draft in drafts {
        let input = NewSuggestion {
            suggestion_type: draft.suggestion_type.clone(),
            source_type: document.doc_type.clone(),
            source_id: document.id,
            target_type: draft.target_candidate.as_ref().map(|t| t.entity_type.clone()),
            target_id: draft.target_candidate.as_ref().map(|t| t.entity_id),
            confidence: draft.confidence_score,
            evidence: draft.evidence.clone(),
            suggested_actions: draft.suggested_actions.clone(),
        };

        let suggestion = SuggestionRepo::upsert_draft(pool, &input).await?;
        let freshly_created = suggestion.freshly_created();

        if let Some(pattern) = auto_pattern
            .as_ref()
            .filter(|p| pattern_covers(p, &suggestion))
        {
            match auto_apply(pool, internal, &suggestion, pattern).await {
                Ok(id) => {
                    report.auto_applied.push(id);
                    continue;
                }
                Err(err) => {
                    // Fall back to the manual queue; the suggestion is
                    // still pending with the failure noted on it.
                    tracing::warn!(
                        suggestion_id = suggestion.id,
                        pattern_id = pattern.id,
                        error = %err,
                        "Auto-apply failed; suggestion left for manual review",
                    );
                }
            }
        }

        if freshly_created {
            report.created.push(suggestion);
        } else {
            report.updated.push(suggestion);
        }
    }

    tracing::info!(
        document_id = document.id,
        created = report.created.len(),
        updated = report.updated.len(),
        auto_applied = report.auto_applied.len(),
        quarantined = report.quarantined.len(),
        "Detector batch ingested",
    );

    Ok(report)
}

/// Find an active auto-apply pattern matching the document's sender.
///
/// Exact sender-email patterns win over sender-domain patterns. Internal
/// senders never match; their traffic is routine coordination, not signal.
async fn find_auto_apply_pattern(
    pool: &PgPool,
    internal: &InternalDomains,
    document: &SourceDocument,
) -> Result<Option<Pattern>, sqlx::Error> {
    let Some(raw_sender) = document.sender.as_deref() else {
        return Ok(None);
    };
    let Some(email) = sender::parse_email(raw_sender) else {
        return Ok(None);
    };
    if internal.is_internal_address(&email) {
        return Ok(None);
    }

    if let Some(p) = PatternRepo::find_active_by_key(pool, PATTERN_TYPE_SENDER_EMAIL, &email)
        .await?
        .filter(|p| p.auto_apply)
    {
        return Ok(Some(p));
    }

    if let Some(domain) = sender::parse_domain(&email) {
        if let Some(p) = PatternRepo::find_active_by_key(pool, PATTERN_TYPE_SENDER_DOMAIN, &domain)
            .await?
            .filter(|p| p.auto_apply)
        {
            return Ok(Some(p));
        }
    }

    Ok(None)
}

/// A pattern only auto-applies a suggestion proposing its own target.
fn pattern_covers(pattern: &Pattern, suggestion: &Suggestion) -> bool {
    suggestion.target_type.as_deref() == Some(pattern.target_type.as_str())
        && suggestion.target_id == Some(pattern.target_id)
}

/// Resolve a just-ingested suggestion through the normal approval path,
/// attributed to the pattern instead of a reviewer.
async fn auto_apply(
    pool: &PgPool,
    internal: &InternalDomains,
    suggestion: &Suggestion,
    pattern: &Pattern,
) -> AppResult<DbId> {
    let req = ApproveRequest {
        reviewer: Some(format!("pattern:{}", pattern.id)),
        ..ApproveRequest::default()
    };
    let outcome = decision::approve(pool, internal, suggestion.id, &req).await?;
    tracing::info!(
        suggestion_id = outcome.suggestion.id,
        pattern_id = pattern.id,
        "Suggestion auto-applied by pattern",
    );
    Ok(outcome.suggestion.id)
}
