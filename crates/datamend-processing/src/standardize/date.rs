//! Date canonicalization.

use chrono::NaiveDate;

/// Accepted input formats, tried in order. ISO comes first so canonical
/// values parse on the first attempt; US month-first ordering wins over
/// day-first for ambiguous slash dates.
const ACCEPTED_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a raw date against the accepted formats and rewrite it with the
/// canonical output format. Returns `None` when no format matches.
pub(crate) fn canonicalize_date(value: &str, output_format: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in ACCEPTED_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.format(output_format).to_string());
        }
    }
    None
}
