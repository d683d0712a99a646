//! Email canonicalization.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex: email"));

/// Canonical form of an email: trimmed and ASCII-lowercased.
///
/// Returns `None` when the trimmed value does not match the email grammar;
/// such values are left untouched and surface as malformed in the final
/// assessment.
pub(crate) fn canonicalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if !EMAIL_PATTERN.is_match(trimmed) {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_trims_and_lowercases() {
        assert_eq!(
            canonicalize_email("  John.Doe@EXAMPLE.com "),
            Some("john.doe@example.com".to_string())
        );
    }

    #[test]
    fn test_canonical_input_unchanged() {
        assert_eq!(
            canonicalize_email("a@b.co"),
            Some("a@b.co".to_string())
        );
    }

    #[test]
    fn test_malformed_returns_none() {
        assert_eq!(canonicalize_email("not-an-email"), None);
        assert_eq!(canonicalize_email("a@b"), None);
        assert_eq!(canonicalize_email("a b@c.com"), None);
        assert_eq!(canonicalize_email(""), None);
    }
}
