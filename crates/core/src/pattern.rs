//! Pattern type constants, key normalization, and key validation.
//!
//! Patterns are limited to sender-address, sender-domain, and keyword
//! matching. Sender-derived keys are re-validated against the configured
//! internal-domain exclusion every time one is about to be written.

use crate::domains::InternalDomains;
use crate::error::CoreError;
use crate::sender;

/// Matches on the full sender address.
pub const PATTERN_TYPE_SENDER_EMAIL: &str = "sender_email";

/// Matches on the sender's domain.
pub const PATTERN_TYPE_SENDER_DOMAIN: &str = "sender_domain";

/// Matches on a keyword appearing in evidence or the document title.
pub const PATTERN_TYPE_KEYWORD: &str = "keyword";

/// All valid pattern type values.
pub const VALID_PATTERN_TYPES: &[&str] = &[
    PATTERN_TYPE_SENDER_EMAIL,
    PATTERN_TYPE_SENDER_DOMAIN,
    PATTERN_TYPE_KEYWORD,
];

/// Default confidence boost granted by a matching pattern.
pub const DEFAULT_CONFIDENCE_BOOST: f64 = 0.15;

/// Validate that a pattern type string is one of the accepted values.
pub fn validate_pattern_type(pattern_type: &str) -> Result<(), CoreError> {
    if VALID_PATTERN_TYPES.contains(&pattern_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid pattern type '{pattern_type}'. Must be one of: {}",
            VALID_PATTERN_TYPES.join(", ")
        )))
    }
}

/// Normalize and validate a pattern key for the given type.
///
/// - `sender_email` keys must parse as an address and are lowercased.
/// - `sender_domain` keys must look like a domain and are lowercased.
/// - `keyword` keys are lowercased and must be at least 3 characters, so a
///   stray short token cannot become a broad match.
///
/// Sender-derived keys falling on or under a configured internal domain are
/// rejected with [`CoreError::Pattern`].
pub fn normalize_pattern_key(
    pattern_type: &str,
    raw_key: &str,
    internal: &InternalDomains,
) -> Result<String, CoreError> {
    validate_pattern_type(pattern_type)?;

    match pattern_type {
        PATTERN_TYPE_SENDER_EMAIL => {
            let email = sender::parse_email(raw_key).ok_or_else(|| {
                CoreError::Pattern(format!("'{raw_key}' is not a valid sender address"))
            })?;
            if internal.is_internal_address(&email) {
                return Err(CoreError::Pattern(format!(
                    "'{email}' belongs to an internal domain and cannot become a pattern"
                )));
            }
            Ok(email)
        }
        PATTERN_TYPE_SENDER_DOMAIN => {
            let domain = raw_key.trim().trim_start_matches('@').to_ascii_lowercase();
            if domain.is_empty() || !domain.contains('.') || domain.contains(char::is_whitespace) {
                return Err(CoreError::Pattern(format!(
                    "'{raw_key}' is not a valid domain"
                )));
            }
            if internal.is_internal(&domain) {
                return Err(CoreError::Pattern(format!(
                    "'{domain}' is an internal domain and cannot become a pattern"
                )));
            }
            Ok(domain)
        }
        _ => {
            let keyword = raw_key.trim().to_ascii_lowercase();
            if keyword.len() < 3 {
                return Err(CoreError::Pattern(format!(
                    "Keyword '{raw_key}' is too short to be a pattern key (minimum 3 characters)"
                )));
            }
            Ok(keyword)
        }
    }
}

/// Whether a keyword pattern key occurs in `text` on word boundaries.
///
/// "bali" must not match "verbalise"; multi-word keys match as a phrase.
pub fn keyword_matches(key: &str, text: &str) -> bool {
    let escaped = regex::escape(key);
    match regex::RegexBuilder::new(&format!(r"\b{escaped}\b"))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

/// Validate a confidence boost value. Boosts are additive on display and
/// capped at 1.0 downstream, but a boost outside (0, 1] is meaningless.
pub fn validate_confidence_boost(boost: f64) -> Result<(), CoreError> {
    if !boost.is_finite() || boost <= 0.0 || boost > 1.0 {
        return Err(CoreError::Validation(format!(
            "Confidence boost {boost} must be in (0, 1]"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn internal() -> InternalDomains {
        InternalDomains::from_csv("bensley.com")
    }

    #[test]
    fn test_valid_pattern_types() {
        assert!(validate_pattern_type("sender_email").is_ok());
        assert!(validate_pattern_type("sender_domain").is_ok());
        assert!(validate_pattern_type("keyword").is_ok());
        assert!(validate_pattern_type("regex").is_err());
    }

    #[test]
    fn test_sender_email_key_normalized() {
        let key = normalize_pattern_key(
            PATTERN_TYPE_SENDER_EMAIL,
            "\"Jane Doe\" <Jane@ClientCo.com>",
            &internal(),
        )
        .unwrap();
        assert_eq!(key, "jane@clientco.com");
    }

    #[test]
    fn test_internal_email_key_rejected() {
        let err = normalize_pattern_key(
            PATTERN_TYPE_SENDER_EMAIL,
            "\"IT Support\" <it@bensley.com>",
            &internal(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Pattern(_)));
    }

    #[test]
    fn test_domain_key_normalized() {
        let key =
            normalize_pattern_key(PATTERN_TYPE_SENDER_DOMAIN, "ClientCo.com", &internal()).unwrap();
        assert_eq!(key, "clientco.com");
    }

    #[test]
    fn test_internal_domain_key_rejected() {
        assert!(
            normalize_pattern_key(PATTERN_TYPE_SENDER_DOMAIN, "bensley.com", &internal()).is_err()
        );
    }

    #[test]
    fn test_internal_subdomain_key_rejected() {
        assert!(
            normalize_pattern_key(PATTERN_TYPE_SENDER_DOMAIN, "mail.bensley.com", &internal())
                .is_err()
        );
    }

    #[test]
    fn test_keyword_key_normalized() {
        let key = normalize_pattern_key(PATTERN_TYPE_KEYWORD, "  Shinta Mani  ", &internal()).unwrap();
        assert_eq!(key, "shinta mani");
    }

    #[test]
    fn test_short_keyword_rejected() {
        assert!(normalize_pattern_key(PATTERN_TYPE_KEYWORD, "ab", &internal()).is_err());
    }

    #[test]
    fn test_keyword_matches_on_word_boundaries() {
        assert!(keyword_matches("bali", "Site visit to Bali next week"));
        assert!(!keyword_matches("bali", "they verbalise constantly"));
        assert!(keyword_matches("shinta mani", "RE: Shinta Mani Wild fees"));
        assert!(!keyword_matches("shinta mani", "shinta only"));
    }

    #[test]
    fn test_boost_range() {
        assert!(validate_confidence_boost(0.15).is_ok());
        assert!(validate_confidence_boost(1.0).is_ok());
        assert!(validate_confidence_boost(0.0).is_err());
        assert!(validate_confidence_boost(-0.1).is_err());
        assert!(validate_confidence_boost(1.5).is_err());
    }
}
