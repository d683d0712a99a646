//! Progress reporting for the remediation pipeline.
//!
//! Stage updates are optional: when no reporter is configured the pipeline
//! runs silently (apart from tracing). Reporters must be `Send + Sync` so
//! a pipeline can run on a background thread while the updates land
//! elsewhere.
//!
//! # Example
//!
//! ```rust,ignore
//! use datamend_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the remediation pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Config validation and capacity checks
    Initializing,
    /// Converting textual missing markers to nulls
    Sanitizing,
    /// Schema profiling and type inference
    Profiling,
    /// Quality assessment of the raw data
    BaselineAssessment,
    /// Missing-value resolution
    MissingValues,
    /// Duplicate detection and removal
    Deduplication,
    /// Outlier detection and treatment
    OutlierHandling,
    /// Format standardization (email, phone, date)
    Standardization,
    /// Quality assessment of the remediated data
    FinalAssessment,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Sanitizing => "Sanitizing Missing Markers",
            Self::Profiling => "Profiling Schema",
            Self::BaselineAssessment => "Assessing Baseline Quality",
            Self::MissingValues => "Resolving Missing Values",
            Self::Deduplication => "Removing Duplicates",
            Self::OutlierHandling => "Handling Outliers",
            Self::Standardization => "Standardizing Formats",
            Self::FinalAssessment => "Assessing Final Quality",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Typical weight of this stage in the overall run (0.0 - 1.0). The
    /// processing stages sum to ~1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.02,
            Self::Sanitizing => 0.08,
            Self::Profiling => 0.15,
            Self::BaselineAssessment => 0.10,
            Self::MissingValues => 0.25,
            Self::Deduplication => 0.15,
            Self::OutlierHandling => 0.10,
            Self::Standardization => 0.10,
            Self::FinalAssessment => 0.05,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::Sanitizing => 0.02,
            Self::Profiling => 0.10,
            Self::BaselineAssessment => 0.25,
            Self::MissingValues => 0.35,
            Self::Deduplication => 0.60,
            Self::OutlierHandling => 0.75,
            Self::Standardization => 0.85,
            Self::FinalAssessment => 0.95,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing the current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Create a progress update for a stage.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Create a completion update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Create a failure update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during a pipeline run.
///
/// Implementations must be efficient and non-blocking; updates are emitted
/// once or twice per stage.
pub trait ProgressReporter: Send + Sync {
    /// Called when the pipeline advances.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Create a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(CleaningStage::Profiling, 0.5, "Profiling...");
        assert_eq!(update.stage, CleaningStage::Profiling);
        assert_eq!(update.stage_progress, 0.5);
        assert_eq!(update.message, "Profiling...");
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done");
        assert_eq!(update.stage, CleaningStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_stage_weights_sum_to_one() {
        let stages = [
            CleaningStage::Initializing,
            CleaningStage::Sanitizing,
            CleaningStage::Profiling,
            CleaningStage::BaselineAssessment,
            CleaningStage::MissingValues,
            CleaningStage::Deduplication,
            CleaningStage::OutlierHandling,
            CleaningStage::Standardization,
            CleaningStage::FinalAssessment,
        ];

        let total: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CleaningStage::BaselineAssessment).unwrap(),
            "\"baseline_assessment\""
        );
        assert_eq!(
            serde_json::to_string(&CleaningStage::OutlierHandling).unwrap(),
            "\"outlier_handling\""
        );
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(CleaningStage::Profiling, 0.5, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(
                CleaningStage::Profiling,
                0.5,
                "From background thread",
            ));
        });

        handle.join().expect("Thread should not panic");
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
