use crate::types::DbId;

/// Domain error taxonomy shared by the DB and API layers.
///
/// `Validation`, `Conflict`, `Apply`, and `Pattern` are all locally
/// recoverable: the reviewer can retry, pick a different action, or adjust
/// the correction. `Internal` is reserved for conditions the caller cannot
/// fix (storage unavailability, impossible states).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Apply failed: {0}")]
    Apply(String),

    #[error("Pattern rejected: {0}")]
    Pattern(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
