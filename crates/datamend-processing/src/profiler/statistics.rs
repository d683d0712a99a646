//! Summary statistics for numeric columns.

use polars::prelude::*;

use crate::error::Result;
use crate::types::NumericStats;

/// Compute summary statistics for a numeric column.
///
/// Returns `None` when the column has no non-null values.
pub(crate) fn numeric_stats(series: &Series) -> Result<Option<NumericStats>> {
    let values = non_null_f64(series)?;
    if values.is_empty() {
        return Ok(None);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let stddev = sample_stddev(&values, mean);
    let skewness = skewness_from(&values, mean, stddev);

    Ok(Some(NumericStats {
        min,
        max,
        mean,
        stddev,
        skewness,
    }))
}

/// Skewness of a numeric column, used to choose between mean and median
/// imputation. Returns 0.0 for degenerate columns.
pub(crate) fn column_skewness(series: &Series) -> Result<f64> {
    let values = non_null_f64(series)?;
    if values.is_empty() {
        return Ok(0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let stddev = sample_stddev(&values, mean);
    Ok(skewness_from(&values, mean, stddev))
}

fn non_null_f64(series: &Series) -> Result<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().flatten().collect())
}

/// Sample standard deviation (n-1 divisor); 0.0 for fewer than two values.
fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Mean of cubed z-scores. Zero when the column has no spread.
fn skewness_from(values: &[f64], mean: f64, stddev: f64) -> f64 {
    if stddev == 0.0 || values.len() < 3 {
        return 0.0;
    }
    values
        .iter()
        .map(|v| ((v - mean) / stddev).powi(3))
        .sum::<f64>()
        / values.len() as f64
}
