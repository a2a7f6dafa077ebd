//! Confidence validation, bucketing, and boost arithmetic.
//!
//! Buckets drive review-queue display and ordering urgency only. Nothing in
//! this module, or anywhere else, changes a suggestion's status based on
//! confidence alone: only an explicit reviewer command or an active
//! auto-apply pattern can do that.

use serde::Serialize;

use crate::error::CoreError;

/// Upper bound (exclusive) of the `low` bucket.
pub const LOW_THRESHOLD: f64 = 0.5;

/// Upper bound (inclusive) of the `medium` bucket.
pub const MEDIUM_THRESHOLD: f64 = 0.8;

/// Presentation bucket for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    Low,
    Medium,
    High,
}

/// Validate that a detector-supplied confidence is within `[0, 1]`.
///
/// Out-of-range (or non-finite) scores are rejected at the ingestion
/// boundary; the draft carrying them is quarantined, never persisted.
pub fn validate_confidence(confidence: f64) -> Result<(), CoreError> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(CoreError::Validation(format!(
            "Confidence {confidence} is outside the valid range [0, 1]"
        )));
    }
    Ok(())
}

/// Compute the presentation bucket: low < 0.5, medium 0.5-0.8, high > 0.8.
pub fn bucket(confidence: f64) -> ConfidenceBucket {
    if confidence < LOW_THRESHOLD {
        ConfidenceBucket::Low
    } else if confidence <= MEDIUM_THRESHOLD {
        ConfidenceBucket::Medium
    } else {
        ConfidenceBucket::High
    }
}

/// Apply a pattern's confidence boost, capping the result at 1.0.
pub fn boosted(confidence: f64, boost: f64) -> f64 {
    (confidence + boost).min(1.0)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_confidence_accepted() {
        assert!(validate_confidence(0.0).is_ok());
        assert!(validate_confidence(0.74).is_ok());
        assert!(validate_confidence(1.0).is_ok());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        assert!(validate_confidence(-0.01).is_err());
        assert!(validate_confidence(1.01).is_err());
        assert!(validate_confidence(f64::NAN).is_err());
        assert!(validate_confidence(f64::INFINITY).is_err());
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket(0.0), ConfidenceBucket::Low);
        assert_eq!(bucket(0.49), ConfidenceBucket::Low);
        assert_eq!(bucket(0.5), ConfidenceBucket::Medium);
        assert_eq!(bucket(0.8), ConfidenceBucket::Medium);
        assert_eq!(bucket(0.81), ConfidenceBucket::High);
        assert_eq!(bucket(1.0), ConfidenceBucket::High);
    }

    #[test]
    fn test_boost_caps_at_one() {
        assert_eq!(boosted(0.74, 0.1), 0.84);
        assert_eq!(boosted(0.95, 0.2), 1.0);
        assert_eq!(boosted(1.0, 0.5), 1.0);
    }
}
