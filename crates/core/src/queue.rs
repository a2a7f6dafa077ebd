//! Review queue ordering and cursor handling.
//!
//! The queue's total order is confidence DESC, created_at DESC, id DESC.
//! Navigation uses a keyset cursor over that triple, never a numeric
//! offset, so items resolved concurrently by other sessions are neither
//! skipped nor repeated: the cursor simply names the last item seen and the
//! next fetch continues strictly after it.

use chrono::TimeZone;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default page size for queue listings.
pub const DEFAULT_QUEUE_LIMIT: i64 = 20;

/// Maximum page size for queue listings.
pub const MAX_QUEUE_LIMIT: i64 = 100;

/// Keyset position within the review queue ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueCursor {
    pub confidence: f64,
    pub created_at: Timestamp,
    pub id: DbId,
}

impl QueueCursor {
    /// Encode as an opaque token: confidence bit pattern, microsecond
    /// timestamp, and row id, hex-joined. The bit-pattern round-trip is
    /// exact, so the cursor compares identically to the stored row.
    pub fn encode(&self) -> String {
        format!(
            "{:016x}-{:x}-{:x}",
            self.confidence.to_bits(),
            self.created_at.timestamp_micros(),
            self.id
        )
    }

    /// Decode a cursor token produced by [`QueueCursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::Validation(format!("Invalid queue cursor '{token}'"));

        let mut parts = token.splitn(3, '-');
        let bits = parts.next().ok_or_else(invalid)?;
        let micros = parts.next().ok_or_else(invalid)?;
        let id = parts.next().ok_or_else(invalid)?;

        let confidence = f64::from_bits(u64::from_str_radix(bits, 16).map_err(|_| invalid())?);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(invalid());
        }
        let micros = i64::from_str_radix(micros, 16).map_err(|_| invalid())?;
        let created_at = chrono::Utc
            .timestamp_micros(micros)
            .single()
            .ok_or_else(invalid)?;
        let id = DbId::from_str_radix(id, 16).map_err(|_| invalid())?;

        Ok(Self {
            confidence,
            created_at,
            id,
        })
    }
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
