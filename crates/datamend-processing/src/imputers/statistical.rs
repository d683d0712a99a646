//! Statistical fill-value selection for numeric columns.

use polars::prelude::*;

use crate::config::NumericMissingStrategy;
use crate::error::Result;
use crate::profiler::column_skewness;
use crate::types::CorrectionRule;
use crate::utils::{quantile_sorted, sorted_values};

/// Fill value and rule for a numeric column under the configured strategy.
///
/// Under `Auto`, mean is used when the column is close to symmetric
/// (`|skewness| <= skewness_threshold`) and median otherwise, since the
/// median resists the long tail that skewed the mean in the first place.
/// Returns `None` when the column has no non-null values to derive from, or
/// when the strategy is `Drop`.
pub(crate) fn numeric_fill_value(
    series: &Series,
    strategy: NumericMissingStrategy,
    skewness_threshold: f64,
) -> Result<Option<(f64, CorrectionRule)>> {
    let float_series = series.cast(&DataType::Float64)?;
    if float_series.len() == float_series.null_count() {
        return Ok(None);
    }

    let choice = match strategy {
        NumericMissingStrategy::Mean => Some(CorrectionRule::MeanImputation),
        NumericMissingStrategy::Median => Some(CorrectionRule::MedianImputation),
        NumericMissingStrategy::Auto => {
            let skew = column_skewness(&float_series)?;
            if skew.abs() <= skewness_threshold {
                Some(CorrectionRule::MeanImputation)
            } else {
                Some(CorrectionRule::MedianImputation)
            }
        }
        NumericMissingStrategy::Drop => None,
    };

    let Some(rule) = choice else {
        return Ok(None);
    };

    // The median uses the same sorted-index rule as the outlier bounds, so a
    // filled value can never itself land outside the detection window.
    let value = match rule {
        CorrectionRule::MeanImputation => float_series.mean(),
        _ => {
            let sorted = sorted_values(&float_series)?;
            if sorted.is_empty() {
                None
            } else {
                Some(quantile_sorted(&sorted, 0.5))
            }
        }
    };

    Ok(value.map(|v| (v, rule)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_symmetric_uses_mean() {
        let series = Series::new("v".into(), &[Some(1.0f64), Some(2.0), Some(3.0), None]);
        let (value, rule) =
            numeric_fill_value(&series, NumericMissingStrategy::Auto, 1.0)
                .unwrap()
                .unwrap();

        assert_eq!(rule, CorrectionRule::MeanImputation);
        assert_eq!(value, 2.0);
    }

    #[test]
    fn test_auto_skewed_uses_median() {
        let series = Series::new(
            "income".into(),
            &[Some(1.0f64), Some(1.0), Some(1.0), Some(1.0), Some(100.0), None],
        );
        let (value, rule) =
            numeric_fill_value(&series, NumericMissingStrategy::Auto, 1.0)
                .unwrap()
                .unwrap();

        assert_eq!(rule, CorrectionRule::MedianImputation);
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_forced_median() {
        let series = Series::new("v".into(), &[Some(1.0f64), Some(2.0), Some(9.0), None]);
        let (value, rule) =
            numeric_fill_value(&series, NumericMissingStrategy::Median, 1.0)
                .unwrap()
                .unwrap();

        assert_eq!(rule, CorrectionRule::MedianImputation);
        assert_eq!(value, 2.0);
    }

    #[test]
    fn test_median_uses_sorted_index_rule() {
        // Even count: the sorted-index rule picks element floor(4 * 0.5) = 2,
        // not the interpolated midpoint 2.5.
        let series = Series::new(
            "v".into(),
            &[Some(1.0f64), Some(2.0), Some(3.0), Some(10.0), None],
        );
        let (value, rule) =
            numeric_fill_value(&series, NumericMissingStrategy::Median, 1.0)
                .unwrap()
                .unwrap();

        assert_eq!(rule, CorrectionRule::MedianImputation);
        assert_eq!(value, 3.0);
    }

    #[test]
    fn test_drop_strategy_yields_none() {
        let series = Series::new("v".into(), &[Some(1.0f64), None]);
        assert!(
            numeric_fill_value(&series, NumericMissingStrategy::Drop, 1.0)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_all_null_yields_none() {
        let series = Series::new("v".into(), &[None::<f64>, None]);
        assert!(
            numeric_fill_value(&series, NumericMissingStrategy::Auto, 1.0)
                .unwrap()
                .is_none()
        );
    }
}
