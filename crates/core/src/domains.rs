//! Internal/organizational domain exclusion list.
//!
//! The studio's own domains must never become pattern keys: every internal
//! email matching a learned rule would otherwise reinforce a spurious
//! external classification. The list is injected configuration, not a
//! constant, so deployments customize it without code changes.

/// The configured set of internal/organizational domains.
///
/// Membership checks cover exact matches and subdomains: with
/// `bensley.com` configured, both `bensley.com` and `mail.bensley.com`
/// are internal.
#[derive(Debug, Clone, Default)]
pub struct InternalDomains {
    domains: Vec<String>,
}

impl InternalDomains {
    /// Build from an iterator of domain strings (normalized to lowercase,
    /// empty entries dropped).
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// Parse a comma-separated list, as supplied via the
    /// `INTERNAL_DOMAINS` environment variable.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    /// Whether `domain` is, or is a subdomain of, a configured internal domain.
    pub fn is_internal(&self, domain: &str) -> bool {
        let domain = domain.trim().to_ascii_lowercase();
        self.domains
            .iter()
            .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
    }

    /// Whether a full email address belongs to an internal domain.
    pub fn is_internal_address(&self, email: &str) -> bool {
        match email.rsplit_once('@') {
            Some((_, domain)) => self.is_internal(domain),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn internal() -> InternalDomains {
        InternalDomains::from_csv("bensley.com, bensley.co.th")
    }

    #[test]
    fn test_exact_match_is_internal() {
        assert!(internal().is_internal("bensley.com"));
        assert!(internal().is_internal("BENSLEY.COM"));
    }

    #[test]
    fn test_subdomain_is_internal() {
        assert!(internal().is_internal("mail.bensley.com"));
        assert!(internal().is_internal("studio.bkk.bensley.co.th"));
    }

    #[test]
    fn test_external_domain_is_not_internal() {
        assert!(!internal().is_internal("clientco.com"));
        // Suffix overlap without a dot boundary is not a subdomain.
        assert!(!internal().is_internal("notbensley.com"));
    }

    #[test]
    fn test_internal_address() {
        assert!(internal().is_internal_address("it@bensley.com"));
        assert!(!internal().is_internal_address("jane@clientco.com"));
        assert!(!internal().is_internal_address("no-at-sign"));
    }

    #[test]
    fn test_empty_config_matches_nothing() {
        let none = InternalDomains::from_csv("");
        assert!(none.is_empty());
        assert!(!none.is_internal("bensley.com"));
    }
}
