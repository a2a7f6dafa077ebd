//! Declarative mutation diff types.
//!
//! A preview describes, without executing, exactly what applying a
//! suggestion (or a correction's replacement targets) would change: target
//! table, operation, and ordered field-level old -> new values. Apply
//! executes exactly the previewed entries inside the resolving transaction
//! and returns them as the realized mutation summary.

use serde::{Deserialize, Serialize};

/// Row insertion.
pub const OP_INSERT: &str = "insert";

/// Row update.
pub const OP_UPDATE: &str = "update";

/// Row deletion.
pub const OP_DELETE: &str = "delete";

/// One field-level change within a mutation entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Option<serde_json::Value>,
    pub new: Option<serde_json::Value>,
}

impl FieldChange {
    /// A field set on insert (no prior value).
    pub fn set(field: &str, new: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.to_string(),
            old: None,
            new: Some(new.into()),
        }
    }
}

/// One table-level operation in a preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEntry {
    pub table: String,
    pub operation: String,
    /// The suggested-action id this entry realizes, when one does.
    pub action_id: Option<String>,
    pub description: String,
    pub changes: Vec<FieldChange>,
}

/// The full declarative diff for one resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationPreview {
    pub entries: Vec<MutationEntry>,
}

impl MutationPreview {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Restrict the preview to the given selected action ids. Entries not
    /// tied to any action (e.g. correction link rows) are always kept.
    pub fn select(self, selected_action_ids: &[String]) -> Self {
        let entries = self
            .entries
            .into_iter()
            .filter(|e| match &e.action_id {
                Some(id) => selected_action_ids.iter().any(|s| s == id),
                None => true,
            })
            .collect();
        Self { entries }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action_id: Option<&str>) -> MutationEntry {
        MutationEntry {
            table: "document_links".to_string(),
            operation: OP_INSERT.to_string(),
            action_id: action_id.map(str::to_string),
            description: "link".to_string(),
            changes: vec![FieldChange::set("target_id", 17)],
        }
    }

    #[test]
    fn test_select_keeps_chosen_actions() {
        let preview = MutationPreview {
            entries: vec![entry(Some("a")), entry(Some("b"))],
        };
        let selected = preview.select(&["a".to_string()]);
        assert_eq!(selected.entries.len(), 1);
        assert_eq!(selected.entries[0].action_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_select_keeps_unkeyed_entries() {
        let preview = MutationPreview {
            entries: vec![entry(None), entry(Some("b"))],
        };
        let selected = preview.select(&[]);
        assert_eq!(selected.entries.len(), 1);
        assert!(selected.entries[0].action_id.is_none());
    }

    #[test]
    fn test_field_change_set_has_no_old_value() {
        let change = FieldChange::set("source_id", 4821);
        assert!(change.old.is_none());
        assert_eq!(change.new, Some(serde_json::json!(4821)));
    }
}
