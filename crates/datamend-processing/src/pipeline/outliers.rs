//! Outlier detection and treatment for numeric columns.
//!
//! Bounds are computed once per column before any value changes, so a capped
//! value never shifts the bounds used for the values after it. The same bound
//! math backs the quality assessor's read-only outlier counts.

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::{OutlierMethod, OutlierPolicy, PipelineConfig};
use crate::error::Result;
use crate::types::{
    ColumnType, Correction, CorrectionLog, CorrectionRule, DatasetProfile,
};
use crate::utils::{quantile_sorted, sorted_values};

/// Scaling constant relating the MAD to the standard deviation of a normal
/// distribution.
const MAD_SCALE: f64 = 0.6745;

/// Inclusive [lower, upper] bounds for acceptable values in a column.
///
/// Returns `None` when the column has no spread to measure against (fewer
/// than two values, or MAD/IQR of zero), in which case nothing is an outlier.
pub(crate) fn outlier_bounds(
    sorted: &[f64],
    method: OutlierMethod,
    threshold: f64,
) -> Option<(f64, f64)> {
    if sorted.len() < 2 {
        return None;
    }

    match method {
        OutlierMethod::ModifiedZscore => {
            let median = quantile_sorted(sorted, 0.5);
            let mut deviations: Vec<f64> = sorted.iter().map(|v| (v - median).abs()).collect();
            deviations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mad = quantile_sorted(&deviations, 0.5);
            if mad == 0.0 {
                return None;
            }
            let spread = threshold * mad / MAD_SCALE;
            Some((median - spread, median + spread))
        }
        OutlierMethod::Iqr => {
            let q1 = quantile_sorted(sorted, 0.25);
            let q3 = quantile_sorted(sorted, 0.75);
            let iqr = q3 - q1;
            if iqr == 0.0 {
                return None;
            }
            Some((q1 - threshold * iqr, q3 + threshold * iqr))
        }
    }
}

/// Count the values of a sorted column lying outside its bounds.
pub(crate) fn count_outliers(sorted: &[f64], method: OutlierMethod, threshold: f64) -> usize {
    match outlier_bounds(sorted, method, threshold) {
        Some((lower, upper)) => sorted.iter().filter(|&&v| v < lower || v > upper).count(),
        None => 0,
    }
}

/// Applies the configured outlier policy to every numeric column.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Handle outliers in all numeric columns, per the configured method,
    /// threshold, and policy.
    pub fn handle(
        df: DataFrame,
        profile: &DatasetProfile,
        config: &PipelineConfig,
        log: &mut CorrectionLog,
    ) -> Result<DataFrame> {
        let mut df = df;
        let threshold = config.effective_outlier_threshold();
        // Under the remove policy, rows flagged by any column go together.
        let mut remove_mask = vec![true; df.height()];
        let mut handled_total = 0usize;

        for col_profile in &profile.column_profiles {
            if col_profile.inferred_type != ColumnType::Numeric {
                continue;
            }
            let Ok(col) = df.column(&col_profile.name) else {
                continue;
            };
            let series = col.as_materialized_series().clone();

            let sorted = sorted_values(&series)?;
            let Some((lower, upper)) = outlier_bounds(&sorted, config.outlier_method, threshold)
            else {
                debug!(column = %col_profile.name, "no measurable spread, skipping");
                continue;
            };

            let float_series = series.cast(&DataType::Float64)?;
            let f64_chunked = float_series.f64()?;

            let mut handled = 0usize;
            match config.outlier_policy {
                OutlierPolicy::Cap => {
                    let mut values: Vec<Option<f64>> = Vec::with_capacity(f64_chunked.len());
                    for (row, opt_val) in f64_chunked.into_iter().enumerate() {
                        match opt_val {
                            Some(val) if val < lower || val > upper => {
                                let capped = val.clamp(lower, upper);
                                log.push(
                                    Correction::new(
                                        row,
                                        col_profile.name.clone(),
                                        CorrectionRule::OutlierCapped,
                                    )
                                    .with_values(Some(val.to_string()), Some(capped.to_string())),
                                );
                                handled += 1;
                                values.push(Some(capped));
                            }
                            other => values.push(other),
                        }
                    }
                    if handled > 0 {
                        let capped_series =
                            Series::new(col_profile.name.as_str().into(), values);
                        df.replace(&col_profile.name, capped_series)?;
                    }
                }
                OutlierPolicy::Remove => {
                    for (row, opt_val) in f64_chunked.into_iter().enumerate() {
                        if let Some(val) = opt_val
                            && (val < lower || val > upper)
                        {
                            remove_mask[row] = false;
                            log.push(
                                Correction::new(
                                    row,
                                    col_profile.name.clone(),
                                    CorrectionRule::OutlierRemoved,
                                )
                                .with_values(Some(val.to_string()), None),
                            );
                            handled += 1;
                        }
                    }
                }
                OutlierPolicy::Flag => {
                    for (row, opt_val) in f64_chunked.into_iter().enumerate() {
                        if let Some(val) = opt_val
                            && (val < lower || val > upper)
                        {
                            log.push(
                                Correction::new(
                                    row,
                                    col_profile.name.clone(),
                                    CorrectionRule::OutlierFlagged,
                                )
                                .with_values(Some(val.to_string()), None),
                            );
                            handled += 1;
                        }
                    }
                }
            }

            if handled > 0 {
                info!(
                    column = %col_profile.name,
                    handled,
                    lower,
                    upper,
                    policy = ?config.outlier_policy,
                    "handled outliers"
                );
                handled_total += handled;
            }
        }

        if config.outlier_policy == OutlierPolicy::Remove && handled_total > 0 {
            let mask = BooleanChunked::from_slice("keep".into(), &remove_mask);
            df = df.filter(&mask)?;
        }

        Ok(df)
    }
}
