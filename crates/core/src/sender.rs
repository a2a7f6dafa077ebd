//! Sender address parsing and normalization.
//!
//! Source documents arrive with senders in either bare (`jane@clientco.com`)
//! or display-name (`"Jane Doe" <jane@clientco.com>`) form. Pattern keys are
//! derived from the normalized address and its domain, so the display-name
//! wrapper must be stripped before anything is learned from the sender.

/// Extract and normalize the email address from a sender string.
///
/// Handles `"Display Name" <addr@host>`, `Display Name <addr@host>`, and
/// bare `addr@host` forms. The result is lowercased and trimmed. Returns
/// `None` when no plausible address is present.
pub fn parse_email(sender: &str) -> Option<String> {
    let raw = sender.trim();
    if raw.is_empty() {
        return None;
    }

    // Prefer the angle-bracket form when present.
    let addr = match (raw.rfind('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if open < close => &raw[open + 1..close],
        _ => raw,
    };

    let addr = addr.trim().trim_matches('"').to_ascii_lowercase();

    // Minimal shape check: one '@' with non-empty local part and a domain
    // containing at least one dot.
    let at = addr.rfind('@')?;
    let (local, domain) = (&addr[..at], &addr[at + 1..]);
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return None;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return None;
    }

    Some(addr)
}

/// Extract the normalized domain from a sender string.
pub fn parse_domain(sender: &str) -> Option<String> {
    let email = parse_email(sender)?;
    let at = email.rfind('@')?;
    Some(email[at + 1..].to_string())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
