//! Value normalization for duplicate key comparison.

/// Normalize a raw value for key comparison: lowercase, trim, strip
/// punctuation, and collapse internal whitespace.
pub(crate) fn normalize_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = true;

    for ch in value.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        }
        // Punctuation is dropped entirely so "O'Brien" and "OBrien" compare equal.
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalized similarity between two strings in [0, 1]: 1.0 means equal,
/// computed as `1 - levenshtein / max_len`.
pub(crate) fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

/// Levenshtein edit distance over chars, single-row dynamic program.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, &ca) in a_chars.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let next = (prev_diag + cost).min(row[j] + 1).min(row[j + 1] + 1);
            prev_diag = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b_chars.len()]
}
