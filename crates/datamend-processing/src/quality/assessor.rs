//! Quality assessment: issue counts, rates, and the aggregate score.

use chrono::Utc;
use polars::prelude::*;
use tracing::debug;

use crate::cleaner::detect_duplicate_groups;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::outliers::count_outliers;
use crate::standardize::canonicalize;
use crate::types::{ColumnType, DatasetProfile, QualityReport};
use crate::utils::{count_missing, sorted_values};

// Score weights, fixed so baseline and final reports stay comparable.
const WEIGHT_MISSING: f64 = 0.30;
const WEIGHT_DUPLICATE: f64 = 0.25;
const WEIGHT_OUTLIER: f64 = 0.25;
const WEIGHT_MALFORMED: f64 = 0.20;

/// Read-only quality assessor. Running it twice on the same frame produces
/// the same counts and score.
pub struct QualityAssessor;

impl QualityAssessor {
    /// Assess a dataset against its profile and produce a quality report.
    pub fn assess(
        df: &DataFrame,
        profile: &DatasetProfile,
        config: &PipelineConfig,
    ) -> Result<QualityReport> {
        let total_rows = df.height();
        let total_columns = df.width();
        let total_cells = total_rows * total_columns;

        let mut missing_cells = 0usize;
        let mut outlier_values = 0usize;
        let mut malformed_values = 0usize;
        let mut numeric_cells = 0usize;
        let mut format_cells = 0usize;

        let threshold = config.effective_outlier_threshold();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            missing_cells += count_missing(series);

            let column_type = profile
                .column(series.name().as_str())
                .map(|p| p.inferred_type)
                .unwrap_or(ColumnType::Unknown);

            match column_type {
                ColumnType::Numeric => {
                    let sorted = sorted_values(series)?;
                    numeric_cells += sorted.len();
                    outlier_values += count_outliers(&sorted, config.outlier_method, threshold);
                }
                ColumnType::Email | ColumnType::Phone | ColumnType::Date => {
                    let (present, malformed) =
                        Self::count_malformed(series, column_type, config)?;
                    format_cells += present;
                    malformed_values += malformed;
                }
                _ => {}
            }
        }

        let duplicate_rows: usize = detect_duplicate_groups(df, config)?
            .iter()
            .map(|g| g.rows.len() - 1)
            .sum();

        let missing_rate = rate(missing_cells, total_cells);
        let duplicate_rate = rate(duplicate_rows, total_rows);
        let outlier_rate = rate(outlier_values, numeric_cells);
        let malformed_rate = rate(malformed_values, format_cells);

        let score = 100.0
            * (WEIGHT_MISSING * (1.0 - missing_rate)
                + WEIGHT_DUPLICATE * (1.0 - duplicate_rate)
                + WEIGHT_OUTLIER * (1.0 - outlier_rate)
                + WEIGHT_MALFORMED * (1.0 - malformed_rate));

        debug!(
            missing_cells,
            duplicate_rows, outlier_values, malformed_values, score, "assessed dataset"
        );

        Ok(QualityReport {
            timestamp: Utc::now(),
            total_rows,
            total_columns,
            missing_cells,
            duplicate_rows,
            outlier_values,
            malformed_values,
            missing_rate,
            duplicate_rate,
            outlier_rate,
            malformed_rate,
            score,
        })
    }

    /// Count (present, malformed) cells of a format-typed column. A value is
    /// malformed when it is present but has no canonical form.
    fn count_malformed(
        series: &Series,
        column_type: ColumnType,
        config: &PipelineConfig,
    ) -> Result<(usize, usize)> {
        if series.dtype() != &DataType::String {
            return Ok((0, 0));
        }
        let str_series = series.str()?;
        let mut present = 0usize;
        let mut malformed = 0usize;
        for val in str_series.into_iter().flatten() {
            if val.trim().is_empty() {
                continue;
            }
            present += 1;
            if canonicalize(val, column_type, config).is_none() {
                malformed += 1;
            }
        }
        Ok((present, malformed))
    }
}

/// An empty denominator means the issue class does not apply; rate 0.
fn rate(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        count as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::SchemaProfiler;

    fn assess(df: &DataFrame) -> QualityReport {
        let config = PipelineConfig::default();
        let profile = SchemaProfiler::profile_dataset(df, &config).unwrap();
        QualityAssessor::assess(df, &profile, &config).unwrap()
    }

    #[test]
    fn test_clean_dataset_scores_100() {
        let df = df! {
            "name" => &["alice", "bob", "carol"],
            "age" => &[25i64, 34, 29],
        }
        .unwrap();

        let report = assess(&df);
        assert_eq!(report.total_issues(), 0);
        assert!((report.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_dataset_scores_100() {
        let df = DataFrame::empty();
        let report = assess(&df);

        assert_eq!(report.total_rows, 0);
        assert!((report.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_cells_counted() {
        let df = df! {
            "name" => &[Some("alice"), None, Some("carol"), Some("dave")],
            "age" => &[Some(25i64), Some(34), None, Some(29)],
        }
        .unwrap();

        let report = assess(&df);
        assert_eq!(report.missing_cells, 2);
        assert!((report.missing_rate - 0.25).abs() < 1e-9);
        // Only the missing component is dinged: 100 - 30 * 0.25
        assert!((report.score - 92.5).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_rows_counted() {
        let df = df! {
            "name" => &["alice", "bob", "alice", "carol"],
            "city" => &["Austin", "Boston", "Austin", "Denver"],
        }
        .unwrap();

        let report = assess(&df);
        assert_eq!(report.duplicate_rows, 1);
        assert!((report.duplicate_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_outliers_counted() {
        let df = df! {
            "amount" => &[1.0f64, 2.0, 3.0, 4.0, 1000.0],
        }
        .unwrap();

        let report = assess(&df);
        assert_eq!(report.outlier_values, 1);
        assert!((report.outlier_rate - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_format_values_counted() {
        // 4 of 5 valid keeps the column typed as email; the fifth is malformed.
        let df = df! {
            "email" => &[
                "a@example.com",
                "b@test.org",
                "c@mail.net",
                "d@example.com",
                "not-an-email",
            ],
        }
        .unwrap();

        let report = assess(&df);
        assert_eq!(report.malformed_values, 1);
        assert!((report.malformed_rate - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_assessment_is_idempotent_and_read_only() {
        let df = df! {
            "name" => &[Some("alice"), None, Some("alice")],
            "amount" => &[Some(1.0f64), Some(2.0), Some(1.0)],
        }
        .unwrap();

        let before = df.clone();
        let first = assess(&df);
        let second = assess(&df);

        assert!(df.equals_missing(&before));
        assert_eq!(first.missing_cells, second.missing_cells);
        assert_eq!(first.score, second.score);
    }
}
