//! Pattern matcher: read-time annotation of suggestions.
//!
//! For each suggestion the matcher derives candidate keys from its source
//! document (sender address, sender domain, keyword hits in evidence and
//! title), looks up active patterns, and reports the matches plus the
//! boosted display confidence. It never changes stored confidence or
//! status. Because matching happens at fetch time, a pattern created
//! mid-session applies on the next fetch without any rescoring job.

use atelier_core::confidence::{self, ConfidenceBucket};
use atelier_core::domains::InternalDomains;
use atelier_core::pattern::{
    keyword_matches, PATTERN_TYPE_KEYWORD, PATTERN_TYPE_SENDER_DOMAIN, PATTERN_TYPE_SENDER_EMAIL,
};
use atelier_core::sender;
use atelier_db::models::document::SourceDocument;
use atelier_db::models::pattern::Pattern;
use atelier_db::models::suggestion::Suggestion;
use atelier_db::repositories::PatternRepo;
use serde::Serialize;
use sqlx::PgPool;

/// One pattern that matched a suggestion's source.
#[derive(Debug, Clone, Serialize)]
pub struct PatternMatch {
    pub pattern: Pattern,
    /// What the pattern matched on: the sender address, the sender domain,
    /// or the keyword that hit.
    pub matched_on: String,
}

/// The matcher's read-time annotation for one suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct MatchAnnotation {
    pub matches: Vec<PatternMatch>,
    /// Stored confidence plus each match's boost, capped at 1.0.
    pub effective_confidence: f64,
    pub bucket: ConfidenceBucket,
}

/// Annotate a suggestion with active pattern matches.
///
/// Sender-derived keys falling on an internal domain are skipped outright:
/// even if a stale internal pattern row existed, it must not influence
/// display confidence.
pub async fn annotate(
    pool: &PgPool,
    internal: &InternalDomains,
    document: &SourceDocument,
    suggestion: &Suggestion,
) -> Result<MatchAnnotation, sqlx::Error> {
    let mut matches = Vec::new();

    if let Some(sender_raw) = document.sender.as_deref() {
        if let Some(email) = sender::parse_email(sender_raw) {
            if !internal.is_internal_address(&email) {
                if let Some(p) =
                    PatternRepo::find_active_by_key(pool, PATTERN_TYPE_SENDER_EMAIL, &email).await?
                {
                    matches.push(PatternMatch {
                        pattern: p,
                        matched_on: email.clone(),
                    });
                }
            }
        }
        if let Some(domain) = sender::parse_domain(sender_raw) {
            if !internal.is_internal(&domain) {
                if let Some(p) =
                    PatternRepo::find_active_by_key(pool, PATTERN_TYPE_SENDER_DOMAIN, &domain)
                        .await?
                {
                    matches.push(PatternMatch {
                        pattern: p,
                        matched_on: domain.clone(),
                    });
                }
            }
        }
    }

    // Keyword patterns are tested against the document title plus the
    // detector's extracted keywords and summary.
    let haystack = keyword_haystack(document, suggestion);
    for p in PatternRepo::list_active_by_type(pool, PATTERN_TYPE_KEYWORD).await? {
        if keyword_matches(&p.pattern_key, &haystack) {
            let matched_on = p.pattern_key.clone();
            matches.push(PatternMatch {
                pattern: p,
                matched_on,
            });
        }
    }

    let effective_confidence = matches
        .iter()
        .fold(suggestion.confidence, |acc, m| {
            confidence::boosted(acc, m.pattern.confidence_boost)
        });

    Ok(MatchAnnotation {
        matches,
        effective_confidence,
        bucket: confidence::bucket(effective_confidence),
    })
}

fn keyword_haystack(document: &SourceDocument, suggestion: &Suggestion) -> String {
    let mut parts = vec![document.title.clone()];
    parts.push(suggestion.evidence.summary.clone());
    parts.extend(suggestion.evidence.keywords.iter().cloned());
    parts.join("\n")
}
