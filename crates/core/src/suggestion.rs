//! Suggestion status machine, type constants, and rejection reasons.
//!
//! Status transitions form a DAG: `pending` moves to `applied` (through a
//! transient `approved` inside the resolving transaction) or to `rejected`,
//! and nothing ever returns to `pending`. Skip is not a status: a skipped
//! suggestion stays `pending` for later review and only gains a
//! `last_skipped_at` stamp.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Statuses
-------------------------------------------------------------------------- */

/// Awaiting reviewer resolution.
pub const STATUS_PENDING: &str = "pending";

/// Reviewer approved; only ever observed inside the resolving transaction.
pub const STATUS_APPROVED: &str = "approved";

/// Approved and mutation executed. Terminal.
pub const STATUS_APPLIED: &str = "applied";

/// Reviewer rejected (with or without a correction). Terminal.
pub const STATUS_REJECTED: &str = "rejected";

/// All valid status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_APPROVED,
    STATUS_APPLIED,
    STATUS_REJECTED,
];

/// Whether a status is terminal (no further transition allowed).
pub fn is_resolved(status: &str) -> bool {
    status == STATUS_APPLIED || status == STATUS_REJECTED
}

/// Validate a status transition.
///
/// Legal edges: pending -> approved, approved -> applied, pending -> rejected.
/// Everything else, including any edge back to pending, is a conflict.
pub fn validate_transition(from: &str, to: &str) -> Result<(), CoreError> {
    let legal = matches!(
        (from, to),
        (STATUS_PENDING, STATUS_APPROVED)
            | (STATUS_APPROVED, STATUS_APPLIED)
            | (STATUS_PENDING, STATUS_REJECTED)
    );
    if legal {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Illegal status transition '{from}' -> '{to}'"
        )))
    }
}

/* --------------------------------------------------------------------------
Suggestion types
-------------------------------------------------------------------------- */

pub const TYPE_LINK_PROJECT: &str = "link_project";
pub const TYPE_LINK_PROPOSAL: &str = "link_proposal";
pub const TYPE_LINK_CONTACT: &str = "link_contact";
pub const TYPE_NEW_CONTACT: &str = "new_contact";
pub const TYPE_FIELD_CORRECTION: &str = "field_correction";
pub const TYPE_CATEGORIZATION: &str = "categorization";

/// All valid suggestion type values.
pub const VALID_SUGGESTION_TYPES: &[&str] = &[
    TYPE_LINK_PROJECT,
    TYPE_LINK_PROPOSAL,
    TYPE_LINK_CONTACT,
    TYPE_NEW_CONTACT,
    TYPE_FIELD_CORRECTION,
    TYPE_CATEGORIZATION,
];

/// Validate that a suggestion type string is one of the accepted values.
pub fn validate_suggestion_type(suggestion_type: &str) -> Result<(), CoreError> {
    if VALID_SUGGESTION_TYPES.contains(&suggestion_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid suggestion type '{suggestion_type}'. Must be one of: {}",
            VALID_SUGGESTION_TYPES.join(", ")
        )))
    }
}

/// The target entity type a link-style suggestion points at, if any.
pub fn target_entity_type(suggestion_type: &str) -> Option<&'static str> {
    match suggestion_type {
        TYPE_LINK_PROJECT => Some("project"),
        TYPE_LINK_PROPOSAL => Some("proposal"),
        TYPE_LINK_CONTACT | TYPE_NEW_CONTACT => Some("contact"),
        _ => None,
    }
}

/* --------------------------------------------------------------------------
Rejection reasons
-------------------------------------------------------------------------- */

pub const REASON_WRONG_PROJECT: &str = "wrong_project";
pub const REASON_WRONG_PROPOSAL: &str = "wrong_proposal";
pub const REASON_WRONG_CONTACT: &str = "wrong_contact";
pub const REASON_NOT_RELEVANT: &str = "not_relevant";
pub const REASON_DUPLICATE: &str = "duplicate";
pub const REASON_BAD_EXTRACTION: &str = "bad_extraction";
pub const REASON_OTHER: &str = "other";

/// All valid rejection reason values.
pub const VALID_REJECTION_REASONS: &[&str] = &[
    REASON_WRONG_PROJECT,
    REASON_WRONG_PROPOSAL,
    REASON_WRONG_CONTACT,
    REASON_NOT_RELEVANT,
    REASON_DUPLICATE,
    REASON_BAD_EXTRACTION,
    REASON_OTHER,
];

/// Validate that a rejection carries one of the accepted reasons.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if VALID_REJECTION_REASONS.contains(&reason) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid rejection reason '{reason}'. Must be one of: {}",
            VALID_REJECTION_REASONS.join(", ")
        )))
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(validate_transition(STATUS_PENDING, STATUS_APPROVED).is_ok());
        assert!(validate_transition(STATUS_APPROVED, STATUS_APPLIED).is_ok());
        assert!(validate_transition(STATUS_PENDING, STATUS_REJECTED).is_ok());
    }

    #[test]
    fn test_no_edge_returns_to_pending() {
        for from in VALID_STATUSES {
            assert!(
                validate_transition(from, STATUS_PENDING).is_err(),
                "'{from}' -> 'pending' must be illegal"
            );
        }
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        for from in [STATUS_APPLIED, STATUS_REJECTED] {
            for to in VALID_STATUSES {
                assert!(
                    validate_transition(from, to).is_err(),
                    "'{from}' -> '{to}' must be illegal"
                );
            }
        }
    }

    #[test]
    fn test_transition_errors_are_conflicts() {
        let err = validate_transition(STATUS_APPLIED, STATUS_APPLIED).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn test_is_resolved() {
        assert!(is_resolved(STATUS_APPLIED));
        assert!(is_resolved(STATUS_REJECTED));
        assert!(!is_resolved(STATUS_PENDING));
        assert!(!is_resolved(STATUS_APPROVED));
    }

    #[test]
    fn test_suggestion_types() {
        assert!(validate_suggestion_type(TYPE_LINK_PROJECT).is_ok());
        assert!(validate_suggestion_type("link_invoice").is_err());
    }

    #[test]
    fn test_target_entity_types() {
        assert_eq!(target_entity_type(TYPE_LINK_PROJECT), Some("project"));
        assert_eq!(target_entity_type(TYPE_LINK_PROPOSAL), Some("proposal"));
        assert_eq!(target_entity_type(TYPE_LINK_CONTACT), Some("contact"));
        assert_eq!(target_entity_type(TYPE_CATEGORIZATION), None);
    }

    #[test]
    fn test_rejection_reasons() {
        assert!(validate_rejection_reason(REASON_WRONG_PROJECT).is_ok());
        assert!(validate_rejection_reason("because").is_err());
    }
}
