//! Shared utilities for the remediation pipeline.
//!
//! Common helpers used across the profiler, assessor, and resolver modules
//! to keep missing-value and numeric handling consistent.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Missing Value Utilities
// =============================================================================

/// Textual markers treated as missing values in raw customer data.
pub const MISSING_MARKERS: [&str; 8] = [
    "n/a", "na", "null", "none", "missing", "nan", "unknown", "#n/a",
];

/// Check if a string value counts as missing (empty, whitespace-only, or a
/// known missing marker).
pub fn is_missing_str(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&m| lower == m)
}

/// Count missing cells in a series: nulls plus whitespace-only strings.
///
/// Does not mutate the series; used by the assessor so that counts stay
/// meaningful even before sanitization has run.
pub fn count_missing(series: &Series) -> usize {
    let nulls = series.null_count();
    if series.dtype() != &DataType::String {
        return nulls;
    }
    let Ok(str_series) = series.str() else {
        return nulls;
    };
    let blank = str_series
        .into_iter()
        .flatten()
        .filter(|v| v.trim().is_empty())
        .count();
    nulls + blank
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Try to parse a string as a numeric value (f64), tolerating thousands
/// separators and surrounding whitespace.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Check if a string can be parsed as a numeric value.
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Quantile of a sorted slice using the sorted-index rule `idx = floor(n * q)`.
///
/// The slice must be sorted ascending and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() as f64) * q) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Collect the non-null values of a numeric series as f64, sorted ascending.
pub fn sorted_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = float_series.f64()?.into_iter().flatten().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(values)
}

/// Calculate the mode of a string series.
///
/// Tie-break is deterministic: highest count wins, ties go to the
/// lexicographically smallest value.
pub fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }

    let str_series = non_null.cast(&DataType::String).ok()?;
    let str_chunked = str_series.str().ok()?;

    let mut value_counts: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    for val in str_chunked.into_iter().flatten() {
        *value_counts.entry(val.to_string()).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(val, _)| val)
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let mask = series.is_null();
    let len = series.len();
    let mut result_vec = Vec::with_capacity(len);

    for i in 0..len {
        if mask.get(i).unwrap_or(false) {
            result_vec.push(Some(fill_value));
        } else {
            let val = series.get(i)?;
            result_vec.push(Some(val.try_extract::<f64>()?));
        }
    }

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Fill null values in a string series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_series = series.str()?;
    let result_vec: Vec<Option<String>> = str_series
        .into_iter()
        .map(|opt| {
            Some(match opt {
                Some(v) => v.to_string(),
                None => fill_value.to_string(),
            })
        })
        .collect();

    Ok(Series::new(series.name().clone(), result_vec))
}

/// Read a cell as a display string, or `None` when the cell is null.
///
/// String columns come back without the surrounding quotes polars' AnyValue
/// display would add.
pub fn cell_to_string(series: &Series, idx: usize) -> Option<String> {
    if series.is_null().get(idx).unwrap_or(true) {
        return None;
    }
    if series.dtype() == &DataType::String {
        return series
            .str()
            .ok()
            .and_then(|s| s.get(idx))
            .map(|v| v.to_string());
    }
    series.get(idx).ok().map(|v| format!("{}", v))
}

// =============================================================================
// Tests
// =============================================================================
