//! Mutation preview: the declarative diff a resolution implies.
//!
//! A preview is computed without touching the store and describes exactly
//! what apply will execute: which table, which operation, which fields.
//! The decision processor executes previews entry by entry inside the
//! resolving transaction; anything the preview does not describe does not
//! happen.

use atelier_core::error::CoreError;
use atelier_core::mutation::{FieldChange, MutationEntry, MutationPreview, OP_INSERT};
use atelier_core::suggestion as status;
use atelier_db::models::correction::TargetRef;
use atelier_db::models::suggestion::Suggestion;

/// Action types the apply step knows how to execute.
pub const ACTION_CREATE_LINK: &str = "create_link";
pub const ACTION_CREATE_CONTACT: &str = "create_contact";

/// Compute the preview for approving a suggestion.
///
/// `selected_action_ids` restricts which suggested actions are realized;
/// `None` means every action flagged `enabled_by_default`. Unknown selected
/// ids and action types the engine cannot execute are validation errors:
/// the reviewer finds out before anything runs, not mid-transaction.
pub fn for_approval(
    suggestion: &Suggestion,
    selected_action_ids: Option<&[String]>,
) -> Result<MutationPreview, CoreError> {
    if let Some(selected) = selected_action_ids {
        for id in selected {
            if !suggestion.suggested_actions.iter().any(|a| &a.id == id) {
                return Err(CoreError::Validation(format!(
                    "Unknown action id '{id}' for suggestion {}",
                    suggestion.id
                )));
            }
        }
    }

    let mut entries = Vec::new();
    for action in suggestion.suggested_actions.iter() {
        let selected = match selected_action_ids {
            Some(ids) => ids.iter().any(|id| id == &action.id),
            None => action.enabled_by_default,
        };
        if !selected {
            continue;
        }

        match action.action_type.as_str() {
            ACTION_CREATE_LINK => {
                let (target_type, target_id) = link_target(suggestion)?;
                entries.push(MutationEntry {
                    table: "document_links".to_string(),
                    operation: OP_INSERT.to_string(),
                    action_id: Some(action.id.clone()),
                    description: action.description.clone(),
                    changes: vec![
                        FieldChange::set("source_type", suggestion.source_type.clone()),
                        FieldChange::set("source_id", suggestion.source_id),
                        FieldChange::set("target_type", target_type.to_string()),
                        FieldChange::set("target_id", target_id),
                    ],
                });
            }
            ACTION_CREATE_CONTACT => {
                let name = suggestion
                    .evidence
                    .detected_contacts
                    .first()
                    .cloned()
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            "Action '{}' needs a detected contact in evidence",
                            action.id
                        ))
                    })?;
                entries.push(MutationEntry {
                    table: "contacts".to_string(),
                    operation: OP_INSERT.to_string(),
                    action_id: Some(action.id.clone()),
                    description: action.description.clone(),
                    changes: vec![FieldChange::set("name", name)],
                });
            }
            other => {
                return Err(CoreError::Validation(format!(
                    "Action '{}' has unsupported type '{other}'",
                    action.id
                )));
            }
        }
    }

    Ok(MutationPreview { entries })
}

/// Compute the preview for a correction's replacement targets: one link
/// row per corrected target. These entries carry no action id; they come
/// from the reviewer, not the detector.
pub fn for_correction(suggestion: &Suggestion, targets: &[TargetRef]) -> MutationPreview {
    let entries = targets
        .iter()
        .map(|t| MutationEntry {
            table: "document_links".to_string(),
            operation: OP_INSERT.to_string(),
            action_id: None,
            description: format!(
                "link {} {} to {} {}",
                suggestion.source_type, suggestion.source_id, t.target_type, t.target_id
            ),
            changes: vec![
                FieldChange::set("source_type", suggestion.source_type.clone()),
                FieldChange::set("source_id", suggestion.source_id),
                FieldChange::set("target_type", t.target_type.clone()),
                FieldChange::set("target_id", t.target_id),
            ],
        })
        .collect();
    MutationPreview { entries }
}

fn link_target(suggestion: &Suggestion) -> Result<(&str, i64), CoreError> {
    let expected = status::target_entity_type(&suggestion.suggestion_type);
    match (&suggestion.target_type, suggestion.target_id, expected) {
        (Some(t), Some(id), _) => Ok((t.as_str(), id)),
        (_, _, Some(expected)) => Err(CoreError::Validation(format!(
            "Suggestion {} has no {expected} target to link",
            suggestion.id
        ))),
        _ => Err(CoreError::Validation(format!(
            "Suggestion {} of type '{}' cannot create links",
            suggestion.id, suggestion.suggestion_type
        ))),
    }
}
