//! The main remediation pipeline and its builder.

use std::sync::Arc;
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::cleaner::{DuplicateResolver, row_missing_counts, sanitize_missing_markers};
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{CleaningError, Result};
use crate::imputers::MissingValueResolver;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::SchemaProfiler;
use crate::quality::QualityAssessor;
use crate::standardize::FormatStandardizer;
use crate::types::{
    CleaningSummary, ColumnType, Correction, CorrectionLog, CorrectionRule, PipelineResult,
};
use crate::utils::parse_numeric_string;

/// The remediation pipeline.
///
/// Use [`Pipeline::builder()`] to configure and create one.
///
/// # Example
///
/// ```rust,ignore
/// use datamend_processing::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("score: {:.1} -> {:.1}",
///     result.baseline_report.score, result.final_report.score);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// The pipeline runs on background threads in embedding applications.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run the full remediation pipeline over a DataFrame.
    ///
    /// Stage order: sanitize missing markers, profile, align numeric types,
    /// baseline assessment, missing values, duplicates, outliers, format
    /// standardization, final assessment.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Quality score {:.1} -> {:.1}",
                    result.baseline_report.score, result.final_report.score
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn stage_start(&self, stage: CleaningStage) {
        self.report_progress(ProgressUpdate::new(
            stage,
            0.0,
            format!("{}...", stage.display_name()),
        ));
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!(
            rows = df.height(),
            columns = df.width(),
            "starting remediation pipeline"
        );
        self.stage_start(CleaningStage::Initializing);

        if let Some(max_rows) = self.config.max_rows_guard
            && df.height() > max_rows
        {
            return Err(CleaningError::CapacityExceeded {
                rows: df.height(),
                max_rows,
            });
        }

        let mut summary = CleaningSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        let mut log = CorrectionLog::new();

        // Sanitize textual missing markers into nulls.
        self.stage_start(CleaningStage::Sanitizing);
        let (df, nullified, trimmed) = sanitize_missing_markers(df)?;
        if nullified > 0 {
            summary.add_action(format!(
                "Converted {} textual missing markers to nulls",
                nullified
            ));
        }
        if trimmed > 0 {
            summary.add_action(format!(
                "Trimmed surrounding whitespace from {} values",
                trimmed
            ));
        }

        // Profile once; every later stage works from this snapshot of types.
        self.stage_start(CleaningStage::Profiling);
        let profile = SchemaProfiler::profile_dataset(&df, &self.config)
            .map_err(|e| CleaningError::ProfilingFailed(e.to_string()))?;
        debug!(shape = ?profile.shape, "profiled dataset");

        // Align string-typed numeric columns to Float64 so imputation and
        // outlier math see real numbers.
        let df = self.align_numeric_columns(df, &profile)?;

        self.stage_start(CleaningStage::BaselineAssessment);
        let baseline_report = QualityAssessor::assess(&df, &profile, &self.config)
            .map_err(|e| CleaningError::AssessmentFailed(e.to_string()))?;
        info!(score = baseline_report.score, "baseline quality assessed");

        self.stage_start(CleaningStage::MissingValues);
        let rows_before = df.height();
        // Snapshot per-row completeness before imputation fills it in; the
        // MostComplete survivor tie-break ranks rows by these counts.
        let original_missing = row_missing_counts(&df);
        let log_start = log.len();
        let df = MissingValueResolver::resolve(df, &profile, &self.config, &mut log)
            .map_err(|e| CleaningError::stage("missing_values", e.to_string()))?;
        let original_missing =
            surviving_missing_counts(original_missing, &log.entries[log_start..]);
        if df.height() < rows_before {
            summary.add_action(format!(
                "Dropped {} rows with unresolvable missing values",
                rows_before - df.height()
            ));
        }

        self.stage_start(CleaningStage::Deduplication);
        let rows_before = df.height();
        let df = DuplicateResolver::resolve(df, &self.config, Some(&original_missing), &mut log)
            .map_err(|e| CleaningError::stage("deduplicate", e.to_string()))?;
        if df.height() < rows_before {
            summary.add_action(format!(
                "Removed {} duplicate rows",
                rows_before - df.height()
            ));
        }

        self.stage_start(CleaningStage::OutlierHandling);
        let corrections_before = log.len();
        let df = OutlierHandler::handle(df, &profile, &self.config, &mut log)
            .map_err(|e| CleaningError::stage("outliers", e.to_string()))?;
        if log.len() > corrections_before {
            summary.add_action(format!(
                "Handled {} outlier values ({:?} policy)",
                log.len() - corrections_before,
                self.config.outlier_policy
            ));
        }

        self.stage_start(CleaningStage::Standardization);
        let corrections_before = log.len();
        let df = FormatStandardizer::standardize(df, &profile, &self.config, &mut log)
            .map_err(|e| CleaningError::stage("standardize", e.to_string()))?;
        if log.len() > corrections_before {
            summary.add_action(format!(
                "Standardized {} format values",
                log.len() - corrections_before
            ));
        }

        self.stage_start(CleaningStage::FinalAssessment);
        let final_report = QualityAssessor::assess(&df, &profile, &self.config)
            .map_err(|e| CleaningError::AssessmentFailed(e.to_string()))?;
        info!(
            baseline = baseline_report.score,
            final_score = final_report.score,
            "final quality assessed"
        );

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.rows_removed = summary.rows_before.saturating_sub(summary.rows_after);
        summary.corrections_applied = log.len();

        if summary.rows_removed_percentage() > 30.0 {
            summary.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                summary.rows_removed_percentage()
            ));
        }

        Ok(PipelineResult {
            cleaned: df,
            profile,
            baseline_report,
            final_report,
            correction_log: log,
            summary,
        })
    }

    /// Cast string-typed numeric columns to Float64, tolerating thousands
    /// separators. Values that fail to parse become nulls and flow into
    /// missing-value resolution.
    fn align_numeric_columns(
        &self,
        df: DataFrame,
        profile: &crate::types::DatasetProfile,
    ) -> Result<DataFrame> {
        let mut df = df;
        for col_profile in &profile.column_profiles {
            if col_profile.inferred_type != ColumnType::Numeric {
                continue;
            }
            let series = df.column(&col_profile.name)?.as_materialized_series();
            if series.dtype() != &DataType::String {
                continue;
            }

            let str_series = series.str()?;
            let values: Vec<Option<f64>> = str_series
                .into_iter()
                .map(|opt| opt.and_then(parse_numeric_string))
                .collect();
            let aligned = Series::new(col_profile.name.as_str().into(), values);
            debug!(column = %col_profile.name, "aligned numeric column to Float64");
            df.replace(&col_profile.name, aligned)?;
        }
        Ok(df)
    }
}

/// Keep only the counts of rows that survived missing-value resolution, so
/// the indices line up with the resolved frame. Dropped rows are read off the
/// resolver's log entries, which are snapshot-relative.
fn surviving_missing_counts(counts: Vec<usize>, entries: &[Correction]) -> Vec<usize> {
    let mut keep = vec![true; counts.len()];
    for entry in entries {
        if matches!(
            entry.rule,
            CorrectionRule::RowDroppedMissingKey | CorrectionRule::RowDroppedMissing
        ) && let Some(row) = entry.row
        {
            keep[row] = false;
        }
    }
    counts
        .into_iter()
        .zip(keep)
        .filter_map(|(count, kept)| kept.then_some(count))
        .collect()
}

/// Builder for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving stage updates.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure. Convenience over
    /// [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(pipeline.progress_reporter.is_none());
        assert!(pipeline.config.max_rows_guard.is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.duplicate_fuzzy_threshold = 2.0;

        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(CleaningStage::Profiling, 0.5, "Test"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capacity_guard() {
        let df = df! {
            "name" => &["a", "b", "c"],
        }
        .unwrap();

        let config = PipelineConfig::builder().max_rows_guard(2).build().unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();

        let err = pipeline.process(df).unwrap_err();
        assert_eq!(err.error_code(), "CAPACITY_EXCEEDED");
    }

    #[test]
    fn test_surviving_missing_counts_drops_removed_rows() {
        let entries = vec![
            Correction::new(1, "customer_id", CorrectionRule::RowDroppedMissingKey),
            Correction::new(0, "age", CorrectionRule::MeanImputation),
        ];

        let counts = surviving_missing_counts(vec![1, 2, 0], &entries);
        assert_eq!(counts, vec![1, 0]);
    }

    #[test]
    fn test_summary_reports_trimmed_whitespace() {
        let df = df! {
            "name" => &["  alice ", "bob", "carol"],
        }
        .unwrap();

        let result = Pipeline::builder().build().unwrap().process(df).unwrap();
        assert!(
            result
                .summary
                .actions
                .iter()
                .any(|a| a.contains("whitespace"))
        );
    }

    #[test]
    fn test_empty_dataframe_is_noop() {
        let df = DataFrame::empty();
        let pipeline = Pipeline::builder().build().unwrap();
        let result = pipeline.process(df).unwrap();

        assert_eq!(result.cleaned.height(), 0);
        assert!((result.final_report.score - 100.0).abs() < 1e-9);
        assert!(result.correction_log.is_empty());
    }
}
