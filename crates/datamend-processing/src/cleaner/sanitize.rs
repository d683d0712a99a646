//! Missing-marker sanitization.
//!
//! Raw exports encode missingness in many textual forms ("N/A", "null",
//! "unknown", blank cells). Converting them all to real nulls up front means
//! every later stage sees a single representation of missing.

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::utils::is_missing_str;

/// Replace textual missing markers and blank strings with nulls in every
/// string column, and trim surrounding whitespace from the values kept.
/// Returns the frame plus the number of cells nullified and trimmed, so the
/// run summary can account for both kinds of mutation.
pub(crate) fn sanitize_missing_markers(df: DataFrame) -> Result<(DataFrame, usize, usize)> {
    let mut df = df;
    let mut nullified = 0usize;
    let mut trimmed_cells = 0usize;
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let str_series = series.str()?;
        let mut changed = false;
        let mut cleaned_values: Vec<Option<String>> = Vec::with_capacity(str_series.len());

        for opt_val in str_series.into_iter() {
            match opt_val {
                Some(val) if is_missing_str(val) => {
                    cleaned_values.push(None);
                    nullified += 1;
                    changed = true;
                }
                Some(val) => {
                    let trimmed = val.trim();
                    if trimmed != val {
                        changed = true;
                        trimmed_cells += 1;
                    }
                    cleaned_values.push(Some(trimmed.to_string()));
                }
                None => cleaned_values.push(None),
            }
        }

        if changed {
            let cleaned_series = Series::new(col_name.as_str().into(), cleaned_values);
            df.replace(col_name, cleaned_series)?;
        }
    }

    if nullified > 0 || trimmed_cells > 0 {
        debug!(
            nullified,
            trimmed = trimmed_cells,
            "sanitized string columns"
        );
    }
    Ok((df, nullified, trimmed_cells))
}
