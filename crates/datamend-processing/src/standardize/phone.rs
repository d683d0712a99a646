//! Phone number canonicalization.

/// Rewrite a phone number through the canonical template, where each `X`
/// marks a digit position.
///
/// Non-digits are stripped first; an 11-digit number with a leading `1` is
/// treated as a NANP country code when the template wants 10 digits. Returns
/// `None` when the digit count does not fit the template.
pub(crate) fn canonicalize_phone(value: &str, template: &str) -> Option<String> {
    let mut digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let wanted = template.chars().filter(|&c| c == 'X').count();

    if digits.len() == wanted + 1 && digits.first() == Some(&'1') && wanted == 10 {
        digits.remove(0);
    }
    if digits.len() != wanted {
        return None;
    }

    let mut out = String::with_capacity(template.len());
    let mut next = digits.into_iter();
    for ch in template.chars() {
        if ch == 'X' {
            // Digit count was checked above.
            out.push(next.next()?);
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NANP: &str = "(XXX) XXX-XXXX";

    #[test]
    fn test_canonicalize_various_separators() {
        assert_eq!(
            canonicalize_phone("555-123-4567", NANP),
            Some("(555) 123-4567".to_string())
        );
        assert_eq!(
            canonicalize_phone("555.123.4567", NANP),
            Some("(555) 123-4567".to_string())
        );
        assert_eq!(
            canonicalize_phone("5551234567", NANP),
            Some("(555) 123-4567".to_string())
        );
    }

    #[test]
    fn test_leading_country_code_dropped() {
        assert_eq!(
            canonicalize_phone("1-555-123-4567", NANP),
            Some("(555) 123-4567".to_string())
        );
        assert_eq!(
            canonicalize_phone("+1 (555) 123-4567", NANP),
            Some("(555) 123-4567".to_string())
        );
    }

    #[test]
    fn test_canonical_input_unchanged() {
        assert_eq!(
            canonicalize_phone("(555) 123-4567", NANP),
            Some("(555) 123-4567".to_string())
        );
    }

    #[test]
    fn test_wrong_digit_count_returns_none() {
        assert_eq!(canonicalize_phone("12345", NANP), None);
        assert_eq!(canonicalize_phone("555-123-45678", NANP), None);
        assert_eq!(canonicalize_phone("", NANP), None);
    }

    #[test]
    fn test_custom_template() {
        assert_eq!(
            canonicalize_phone("5551234567", "XXX-XXX-XXXX"),
            Some("555-123-4567".to_string())
        );
    }
}
