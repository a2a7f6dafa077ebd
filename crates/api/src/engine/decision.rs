//! Decision processor: the approve / reject / skip state machine.
//!
//! Each resolution is one serializable unit of work: lock the suggestion
//! row, verify it is still `pending`, execute the previewed mutations and
//! the status update together, commit. A racing resolver blocks on the row
//! lock, then observes a resolved status and receives a conflict, so no
//! double application is possible.
//!
//! Pattern learning requested alongside a decision runs after the commit
//! and never blocks it: a duplicate or invalid key (including an attempted
//! internal-domain pattern) becomes a warning in the response and a log
//! line, while the approve/reject stands.

use atelier_core::domains::InternalDomains;
use atelier_core::error::CoreError;
use atelier_core::mutation::MutationPreview;
use atelier_core::pattern::{
    self, DEFAULT_CONFIDENCE_BOOST, PATTERN_TYPE_KEYWORD, PATTERN_TYPE_SENDER_DOMAIN,
    PATTERN_TYPE_SENDER_EMAIL,
};
use atelier_core::suggestion as status;
use atelier_core::types::DbId;
use atelier_db::models::correction::TargetRef;
use atelier_db::models::link::NewDocumentLink;
use atelier_db::models::pattern::{CreatePattern, Pattern};
use atelier_db::models::suggestion::Suggestion;
use atelier_db::repositories::{
    CatalogRepo, CorrectionRepo, DocumentRepo, LinkRepo, PatternRepo, SuggestionRepo, TagRepo,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::engine::preview;
use crate::error::{AppError, AppResult};

/* --------------------------------------------------------------------------
Request / outcome types
-------------------------------------------------------------------------- */

/// Reviewer command: approve a pending suggestion.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Restrict to these suggested-action ids; `None` applies every action
    /// flagged `enabled_by_default`.
    pub selected_action_ids: Option<Vec<String>>,
    pub reviewer_notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub create_sender_pattern: bool,
    #[serde(default)]
    pub create_domain_pattern: bool,
    pub reviewer: Option<String>,
}

/// The corrected truth supplied with a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CorrectionRequest {
    #[serde(default)]
    pub target_entities: Vec<TargetRef>,
    pub notes: Option<String>,
    #[serde(default)]
    pub create_pattern: bool,
    /// Pattern type to learn (default: sender_domain).
    pub pattern_type: Option<String>,
    /// Required when learning a keyword pattern.
    pub pattern_keyword: Option<String>,
    pub pattern_notes: Option<String>,
}

/// Reviewer command: reject a pending suggestion.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub rejection_reason: String,
    pub correction: Option<CorrectionRequest>,
    pub reviewer: Option<String>,
}

/// The result of a resolution, returned to the caller.
#[derive(Debug, Serialize)]
pub struct ResolutionOutcome {
    pub suggestion: Suggestion,
    /// The realized mutation summary (empty for reject without correction
    /// targets, and always for skip).
    pub mutations: MutationPreview,
    pub created_patterns: Vec<Pattern>,
    /// Pattern-write failures; informational, the decision itself stood.
    pub pattern_warnings: Vec<String>,
}

/* --------------------------------------------------------------------------
Approve
-------------------------------------------------------------------------- */

/// Approve a suggestion: execute its previewed mutations and transition to
/// `applied`, all in one transaction.
pub async fn approve(
    pool: &PgPool,
    internal: &InternalDomains,
    suggestion_id: DbId,
    req: &ApproveRequest,
) -> AppResult<ResolutionOutcome> {
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let suggestion = SuggestionRepo::lock_by_id(&mut tx, suggestion_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Suggestion",
            id: suggestion_id,
        }))?;

    ensure_pending(&suggestion)?;

    let plan = preview::for_approval(&suggestion, req.selected_action_ids.as_deref())?;

    if let Err(err) = execute_plan(&mut tx, &suggestion, &plan, req.reviewer.as_deref()).await {
        // Roll back the whole resolution, then surface the failure to the
        // reviewer on the still-pending row.
        drop(tx);
        let note = err.to_string();
        SuggestionRepo::attach_error_note(pool, suggestion_id, &note).await?;
        tracing::warn!(suggestion_id, error = %note, "Apply failed; transaction rolled back");
        return Err(err);
    }

    for tag_name in &req.tags {
        let tag = TagRepo::create_or_get(&mut tx, tag_name, None).await?;
        TagRepo::apply_to_suggestion(&mut tx, suggestion_id, tag.id).await?;
    }

    let resolved = SuggestionRepo::mark_applied(
        &mut tx,
        suggestion_id,
        req.reviewer.as_deref(),
        req.reviewer_notes.as_deref(),
    )
    .await?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(
        suggestion_id,
        mutations = plan.entries.len(),
        reviewer = req.reviewer.as_deref().unwrap_or("unknown"),
        "Suggestion approved and applied",
    );

    // Pattern learning never blocks the committed approval.
    let mut created_patterns = Vec::new();
    let mut pattern_warnings = Vec::new();
    if req.create_sender_pattern || req.create_domain_pattern {
        let document = DocumentRepo::find_by_id(pool, resolved.source_id).await?;
        let sender = document.as_ref().and_then(|d| d.sender.clone());
        let target = resolved
            .target_type
            .clone()
            .zip(resolved.target_id)
            .map(|(t, id)| TargetRef {
                target_type: t,
                target_id: id,
            });

        let mut requested = Vec::new();
        if req.create_sender_pattern {
            requested.push(PATTERN_TYPE_SENDER_EMAIL);
        }
        if req.create_domain_pattern {
            requested.push(PATTERN_TYPE_SENDER_DOMAIN);
        }
        for pattern_type in requested {
            match learn_pattern(
                pool,
                internal,
                pattern_type,
                sender.as_deref(),
                None,
                target.as_ref(),
                suggestion_id,
                None,
            )
            .await
            {
                Ok(p) => created_patterns.push(p),
                Err(warning) => pattern_warnings.push(warning),
            }
        }
    }

    Ok(ResolutionOutcome {
        suggestion: resolved,
        mutations: plan,
        created_patterns,
        pattern_warnings,
    })
}

/* --------------------------------------------------------------------------
Reject
-------------------------------------------------------------------------- */

/// Reject a suggestion, optionally recording a correction whose replacement
/// targets are linked in the same transaction.
pub async fn reject(
    pool: &PgPool,
    internal: &InternalDomains,
    suggestion_id: DbId,
    req: &RejectRequest,
) -> AppResult<ResolutionOutcome> {
    status::validate_rejection_reason(&req.rejection_reason)?;
    let targets: &[TargetRef] = req
        .correction
        .as_ref()
        .map(|c| c.target_entities.as_slice())
        .unwrap_or(&[]);
    for t in targets {
        if !matches!(t.target_type.as_str(), "project" | "proposal" | "contact") {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown correction target type '{}'",
                t.target_type
            ))));
        }
    }

    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let suggestion = SuggestionRepo::lock_by_id(&mut tx, suggestion_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Suggestion",
            id: suggestion_id,
        }))?;

    ensure_pending(&suggestion)?;

    let plan = preview::for_correction(&suggestion, targets);

    let mut correction_id = None;
    if let Some(correction_req) = &req.correction {
        let correction = CorrectionRepo::create(
            &mut tx,
            suggestion_id,
            &req.rejection_reason,
            correction_req.notes.as_deref(),
            targets,
        )
        .await?;
        correction_id = Some(correction.id);
    }

    if let Err(err) = execute_plan(&mut tx, &suggestion, &plan, req.reviewer.as_deref()).await {
        drop(tx);
        let note = err.to_string();
        SuggestionRepo::attach_error_note(pool, suggestion_id, &note).await?;
        tracing::warn!(suggestion_id, error = %note, "Correction apply failed; transaction rolled back");
        return Err(err);
    }

    let resolved = SuggestionRepo::mark_rejected(
        &mut tx,
        suggestion_id,
        &req.rejection_reason,
        req.reviewer.as_deref(),
    )
    .await?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(
        suggestion_id,
        reason = %req.rejection_reason,
        corrected_targets = targets.len(),
        "Suggestion rejected",
    );

    // The learned pattern points at the first corrected target: a pattern
    // row has exactly one target, and position one is the reviewer's
    // primary choice.
    let mut created_patterns = Vec::new();
    let mut pattern_warnings = Vec::new();
    if let Some(correction_req) = req.correction.as_ref().filter(|c| c.create_pattern) {
        let document = DocumentRepo::find_by_id(pool, resolved.source_id).await?;
        let sender = document.as_ref().and_then(|d| d.sender.clone());
        let pattern_type = correction_req
            .pattern_type
            .as_deref()
            .unwrap_or(PATTERN_TYPE_SENDER_DOMAIN);

        match learn_pattern(
            pool,
            internal,
            pattern_type,
            sender.as_deref(),
            correction_req.pattern_keyword.as_deref(),
            targets.first(),
            suggestion_id,
            correction_req.pattern_notes.as_deref(),
        )
        .await
        {
            Ok(p) => {
                if let Some(cid) = correction_id {
                    CorrectionRepo::set_created_pattern(pool, cid, p.id).await?;
                }
                created_patterns.push(p);
            }
            Err(warning) => pattern_warnings.push(warning),
        }
    }

    Ok(ResolutionOutcome {
        suggestion: resolved,
        mutations: plan,
        created_patterns,
        pattern_warnings,
    })
}

/* --------------------------------------------------------------------------
Skip
-------------------------------------------------------------------------- */

/// Skip a suggestion for this session. The row stays `pending`.
pub async fn skip(pool: &PgPool, suggestion_id: DbId) -> AppResult<Suggestion> {
    if let Some(skipped) = SuggestionRepo::record_skip(pool, suggestion_id).await? {
        return Ok(skipped);
    }
    match SuggestionRepo::find_by_id(pool, suggestion_id).await? {
        Some(resolved) => Err(AppError::Core(CoreError::Conflict(format!(
            "Suggestion {suggestion_id} is already {}",
            resolved.status
        )))),
        None => Err(AppError::Core(CoreError::NotFound {
            entity: "Suggestion",
            id: suggestion_id,
        })),
    }
}

/* --------------------------------------------------------------------------
Plan execution and pattern learning
-------------------------------------------------------------------------- */

/// Execute a previewed diff entry by entry inside the resolving transaction.
///
/// Any failure here becomes an [`CoreError::Apply`] and the caller rolls
/// the whole transaction back.
async fn execute_plan(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    suggestion: &Suggestion,
    plan: &MutationPreview,
    reviewer: Option<&str>,
) -> AppResult<()> {
    for entry in &plan.entries {
        match entry.table.as_str() {
            "document_links" => {
                let target_type = change_str(entry, "target_type")?;
                let target_id = change_i64(entry, "target_id")?;

                let exists = CatalogRepo::entity_exists(&mut *tx, &target_type, target_id)
                    .await
                    .map_err(AppError::Database)?;
                if !exists {
                    return Err(AppError::Core(CoreError::Apply(format!(
                        "Target {target_type} {target_id} does not exist"
                    ))));
                }

                LinkRepo::insert_if_absent(
                    &mut *tx,
                    &NewDocumentLink {
                        source_type: suggestion.source_type.clone(),
                        source_id: suggestion.source_id,
                        target_type,
                        target_id,
                        created_from_suggestion_id: Some(suggestion.id),
                        created_by: reviewer.map(str::to_string),
                    },
                )
                .await
                .map_err(AppError::Database)?;
            }
            "contacts" => {
                let name = change_str(entry, "name")?;
                CatalogRepo::create_contact_in_tx(&mut *tx, &name, None)
                    .await
                    .map_err(AppError::Database)?;
            }
            other => {
                return Err(AppError::Core(CoreError::Apply(format!(
                    "Preview names unknown table '{other}'"
                ))));
            }
        }
    }
    Ok(())
}

fn change_str(
    entry: &atelier_core::mutation::MutationEntry,
    field: &str,
) -> AppResult<String> {
    entry
        .changes
        .iter()
        .find(|c| c.field == field)
        .and_then(|c| c.new.as_ref())
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| {
            AppError::Core(CoreError::Apply(format!(
                "Preview entry for '{}' is missing field '{field}'",
                entry.table
            )))
        })
}

fn change_i64(entry: &atelier_core::mutation::MutationEntry, field: &str) -> AppResult<i64> {
    entry
        .changes
        .iter()
        .find(|c| c.field == field)
        .and_then(|c| c.new.as_ref())
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| {
            AppError::Core(CoreError::Apply(format!(
                "Preview entry for '{}' is missing field '{field}'",
                entry.table
            )))
        })
}

fn ensure_pending(suggestion: &Suggestion) -> AppResult<()> {
    if suggestion.status != status::STATUS_PENDING {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Suggestion {} is already {}",
            suggestion.id, suggestion.status
        ))));
    }
    Ok(())
}

/// Learn one pattern from a resolution. Returns the warning string on any
/// failure; callers log it and carry on.
#[allow(clippy::too_many_arguments)]
async fn learn_pattern(
    pool: &PgPool,
    internal: &InternalDomains,
    pattern_type: &str,
    sender: Option<&str>,
    keyword: Option<&str>,
    target: Option<&TargetRef>,
    suggestion_id: DbId,
    notes: Option<&str>,
) -> Result<Pattern, String> {
    let result = async {
        let target = target.ok_or_else(|| {
            CoreError::Pattern("No target entity to associate the pattern with".to_string())
        })?;

        // The stored sender may carry a display-name wrapper; reduce it to
        // the raw key the pattern type expects before normalization.
        let raw_key = match pattern_type {
            PATTERN_TYPE_KEYWORD => keyword
                .ok_or_else(|| {
                    CoreError::Pattern("A keyword pattern requires pattern_keyword".to_string())
                })?
                .to_string(),
            PATTERN_TYPE_SENDER_DOMAIN => sender
                .and_then(atelier_core::sender::parse_domain)
                .ok_or_else(|| {
                    CoreError::Pattern(
                        "Source document has no sender domain to learn from".to_string(),
                    )
                })?,
            _ => sender
                .ok_or_else(|| {
                    CoreError::Pattern("Source document has no sender to learn from".to_string())
                })?
                .to_string(),
        };

        let pattern_key = pattern::normalize_pattern_key(pattern_type, &raw_key, internal)?;

        PatternRepo::create_superseding(
            pool,
            &CreatePattern {
                pattern_type: pattern_type.to_string(),
                pattern_key,
                target_type: target.target_type.clone(),
                target_id: target.target_id,
                confidence_boost: DEFAULT_CONFIDENCE_BOOST,
                auto_apply: false,
                created_from_suggestion_id: Some(suggestion_id),
                notes: notes.map(str::to_string),
            },
        )
        .await
        .map_err(|e| CoreError::Pattern(format!("Pattern write failed: {e}")))
    }
    .await;

    match result {
        Ok(p) => {
            tracing::info!(
                pattern_id = p.id,
                pattern_type = %p.pattern_type,
                pattern_key = %p.pattern_key,
                suggestion_id,
                "Pattern learned from resolution",
            );
            Ok(p)
        }
        Err(err) => {
            tracing::warn!(suggestion_id, error = %err, "Pattern not created");
            Err(err.to_string())
        }
    }
}
