//! Semantic type inference for columns.
//!
//! Detection order matters: identifier columns are claimed first so that
//! numeric-looking account numbers never reach the outlier stage, then
//! numeric, then the format types (email, phone, date), and finally
//! categorical as the fallback for string data.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

use crate::error::Result;
use crate::types::ColumnType;
use crate::utils::{is_missing_str, is_numeric_dtype, is_numeric_string};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex: email"));

// Allowed characters in a raw phone value before digit counting.
static PHONE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s().\-]+(?:\s*(?:x|ext\.?)\s*\d+)?$").expect("Invalid regex: phone"));

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}$").expect("Invalid regex: DD Mon YYYY"),
        Regex::new(r"^[A-Za-z]{3,9}\s+\d{1,2},?\s+\d{4}$").expect("Invalid regex: Mon DD YYYY"),
    ]
});

// Code-like tokens: letters/digits with optional separators, at least one digit.
static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").expect("Invalid regex: identifier"));

/// Infer the semantic type of a column.
///
/// `threshold` is the fraction of non-missing values that must validate as a
/// candidate type before the column is assigned that type.
pub(crate) fn infer_column_type(
    series: &Series,
    col_name: &str,
    threshold: f64,
) -> Result<ColumnType> {
    let non_missing = collect_non_missing(series)?;
    if non_missing.is_empty() {
        return Ok(ColumnType::Unknown);
    }

    if is_identifier_column(series, col_name, &non_missing)? {
        return Ok(ColumnType::Identifier);
    }

    if is_numeric_dtype(series.dtype()) {
        return Ok(ColumnType::Numeric);
    }
    if match_fraction(&non_missing, |v| is_numeric_string(v)) >= threshold {
        return Ok(ColumnType::Numeric);
    }

    if match_fraction(&non_missing, |v| EMAIL_PATTERN.is_match(v)) >= threshold {
        return Ok(ColumnType::Email);
    }

    if match_fraction(&non_missing, is_phone_like) >= threshold {
        return Ok(ColumnType::Phone);
    }

    if match_fraction(&non_missing, is_date_like) >= threshold {
        return Ok(ColumnType::Date);
    }

    Ok(ColumnType::Categorical)
}

/// Collect non-missing values as trimmed strings, regardless of dtype.
fn collect_non_missing(series: &Series) -> Result<Vec<String>> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(Vec::new());
    }

    let mut values = Vec::with_capacity(non_null.len());
    if non_null.dtype() == &DataType::String {
        for val in non_null.str()?.into_iter().flatten() {
            if !is_missing_str(val) {
                values.push(val.trim().to_string());
            }
        }
    } else {
        for i in 0..non_null.len() {
            let val = non_null.get(i)?;
            values.push(format!("{}", val));
        }
    }
    Ok(values)
}

fn match_fraction(values: &[String], predicate: impl Fn(&str) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let matched = values.iter().filter(|v| predicate(v)).count();
    matched as f64 / values.len() as f64
}

/// A raw value counts as a phone number when it uses only phone punctuation
/// and contains 7 to 15 digits. Date-shaped values are excluded first, since
/// a dashed ISO date is all digits and dashes too.
pub(crate) fn is_phone_like(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_date_like(trimmed) || !PHONE_CHARS.is_match(trimmed) {
        return false;
    }
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=15).contains(&digits)
}

pub(crate) fn is_date_like(value: &str) -> bool {
    let trimmed = value.trim();
    DATE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// Identifier detection: a name that suggests a key plus near-total
/// uniqueness, or a fully-unique column of code-like tokens.
fn is_identifier_column(series: &Series, col_name: &str, non_missing: &[String]) -> Result<bool> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(false);
    }
    let unique_ratio = non_null.n_unique()? as f64 / non_null.len() as f64;

    let lower = col_name.to_lowercase();
    let name_suggests_id = lower == "id"
        || lower == "uuid"
        || lower == "guid"
        || lower.ends_with("_id")
        || lower.ends_with("_key")
        || lower.ends_with("_code")
        || lower.starts_with("id_");

    if name_suggests_id && unique_ratio >= 0.9 {
        return Ok(true);
    }

    // Unnamed keys: every value unique, code-shaped, and containing digits.
    // String columns only, so a unique measurement column stays numeric.
    if series.dtype() == &DataType::String
        && unique_ratio >= 0.999
        && non_missing.len() >= 5
        && match_fraction(non_missing, |v| {
            IDENTIFIER_PATTERN.is_match(v) && v.chars().any(|c| c.is_ascii_digit())
        }) >= 0.95
    {
        return Ok(true);
    }

    Ok(false)
}
