//! Batch Data-Quality Remediation Library
//!
//! Detects and corrects the four classic quality problems in tabular
//! customer records, built on Polars:
//!
//! - **Missing values**: typed imputation (mean/median/mode/forward-fill),
//!   row drops for identifier and format columns, high-missing column drops
//! - **Duplicate rows**: exact and fuzzy key matching with deterministic
//!   survivor selection
//! - **Statistical outliers**: modified z-score or IQR bounds with cap,
//!   remove, or flag policies
//! - **Inconsistent formats**: canonicalization of emails, phone numbers,
//!   and dates
//!
//! Every run produces before/after quality reports with an aggregate score
//! in [0, 100] and an ordered correction log describing each change.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datamend_processing::{Pipeline, PipelineConfig};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("customers.csv".into()))?
//!     .finish()?;
//!
//! let config = PipelineConfig::builder()
//!     .duplicate_key_columns(["customer_id", "email"])
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! println!(
//!     "score {:.1} -> {:.1}, {} corrections",
//!     result.baseline_report.score,
//!     result.final_report.score,
//!     result.correction_log.len()
//! );
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to customize remediation behavior:
//!
//! ```rust,ignore
//! use datamend_processing::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .missing_column_threshold(0.5)      // Drop columns with >50% missing
//!     .outlier_method(OutlierMethod::Iqr)
//!     .outlier_policy(OutlierPolicy::Remove)
//!     .survivor_policy(SurvivorPolicy::MostComplete)
//!     .duplicate_fuzzy_threshold(0.9)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod standardize;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DuplicateResolver, detect_duplicate_groups};
pub use config::{
    CategoricalMissingStrategy, ConfigValidationError, NumericMissingStrategy, OutlierMethod,
    OutlierPolicy, PipelineConfig, PipelineConfigBuilder, SurvivorPolicy,
};
pub use error::{CleaningError, Result as CleaningResult};
pub use imputers::MissingValueResolver;
pub use pipeline::{
    CleaningStage, ClosureProgressReporter, OutlierHandler, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::SchemaProfiler;
pub use quality::QualityAssessor;
pub use reporting::ReportGenerator;
pub use standardize::FormatStandardizer;
pub use types::{
    CleaningSummary, ColumnProfile, ColumnType, Correction, CorrectionLog, CorrectionRule,
    DatasetProfile, DuplicateGroup, NumericStats, PipelineResult, QualityReport,
};
