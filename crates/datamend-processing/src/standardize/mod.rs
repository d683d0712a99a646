//! Format standardization for email, phone, and date columns.
//!
//! The standardizer rewrites recognizable values into their canonical forms
//! and leaves everything else untouched; it never invents data. Running it on
//! already-canonical data is a no-op with an empty log.

mod date;
mod email;
mod phone;

pub(crate) use date::canonicalize_date;
pub(crate) use email::canonicalize_email;
pub(crate) use phone::canonicalize_phone;

use polars::prelude::*;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{
    ColumnType, Correction, CorrectionLog, CorrectionRule, DatasetProfile,
};

/// Canonical form of a value under a format type, or `None` when the value
/// cannot be recognized.
pub(crate) fn canonicalize(
    value: &str,
    column_type: ColumnType,
    config: &PipelineConfig,
) -> Option<String> {
    match column_type {
        ColumnType::Email => canonicalize_email(value),
        ColumnType::Phone => canonicalize_phone(value, &config.phone_canonical_format),
        ColumnType::Date => canonicalize_date(value, &config.date_canonical_format),
        _ => None,
    }
}

/// Rewrites format-typed columns into their canonical representations.
pub struct FormatStandardizer;

impl FormatStandardizer {
    /// Standardize every email, phone, and date column in place, logging one
    /// correction per changed cell.
    pub fn standardize(
        df: DataFrame,
        profile: &DatasetProfile,
        config: &PipelineConfig,
        log: &mut CorrectionLog,
    ) -> Result<DataFrame> {
        let mut df = df;

        for col_profile in &profile.column_profiles {
            if !col_profile.inferred_type.is_format() {
                continue;
            }
            // Columns can be dropped by earlier stages.
            let Ok(col) = df.column(&col_profile.name) else {
                continue;
            };
            let series = col.as_materialized_series().clone();
            if series.dtype() != &DataType::String {
                continue;
            }

            let rule = match col_profile.inferred_type {
                ColumnType::Email => CorrectionRule::EmailNormalized,
                ColumnType::Phone => CorrectionRule::PhoneNormalized,
                ColumnType::Date => CorrectionRule::DateNormalized,
                _ => continue,
            };

            let str_series = series.str()?;
            let mut changed = 0usize;
            let mut values: Vec<Option<String>> = Vec::with_capacity(str_series.len());

            for (row, opt_val) in str_series.into_iter().enumerate() {
                match opt_val {
                    Some(val) => {
                        match canonicalize(val, col_profile.inferred_type, config) {
                            Some(canonical) if canonical != val => {
                                log.push(
                                    Correction::new(row, col_profile.name.clone(), rule)
                                        .with_values(
                                            Some(val.to_string()),
                                            Some(canonical.clone()),
                                        ),
                                );
                                changed += 1;
                                values.push(Some(canonical));
                            }
                            // Canonical already, or unrecognizable: keep as is.
                            _ => values.push(Some(val.to_string())),
                        }
                    }
                    None => values.push(None),
                }
            }

            if changed > 0 {
                info!(
                    column = %col_profile.name,
                    changed,
                    kind = col_profile.inferred_type.display_name(),
                    "standardized format column"
                );
                let new_series = Series::new(col_profile.name.as_str().into(), values);
                df.replace(&col_profile.name, new_series)?;
            }
        }

        Ok(df)
    }
}
