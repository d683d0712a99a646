//! Configuration types for the remediation pipeline.
//!
//! Uses the builder pattern for flexible and ergonomic pipeline setup; the
//! builder validates thresholds before the pipeline runs so bad configuration
//! can never mutate a dataset.

use serde::{Deserialize, Serialize};

/// Strategy for missing values in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NumericMissingStrategy {
    /// Median by default; mean when the column's skewness is within the
    /// configured skewness threshold.
    #[default]
    Auto,
    Mean,
    Median,
    /// Drop rows with missing values
    Drop,
}

/// Strategy for missing values in categorical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalMissingStrategy {
    /// Use the most frequent value (mode)
    #[default]
    Mode,
    /// Fill with the previous non-null value
    ForwardFill,
    /// Drop rows with missing values
    Drop,
}

/// Statistical method used to bound numeric outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Median/MAD based modified z-score, robust to skew
    #[default]
    ModifiedZscore,
    /// Quartile fencing: [Q1 - k*IQR, Q3 + k*IQR]
    Iqr,
}

impl OutlierMethod {
    /// Default detection threshold when none is configured.
    pub fn default_threshold(&self) -> f64 {
        match self {
            Self::ModifiedZscore => 3.5,
            Self::Iqr => 1.5,
        }
    }
}

/// What to do with values outside the outlier bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// Clamp to the nearest bound, preserving row count
    #[default]
    Cap,
    /// Remove rows containing outliers
    Remove,
    /// Leave values in place, record in the correction log only
    Flag,
}

/// Tie-break for choosing the surviving row of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurvivorPolicy {
    /// Earliest original row index
    #[default]
    FirstOccurrence,
    /// Fewest missing fields; ties go to the earliest index
    MostComplete,
}

/// Configuration for the remediation pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use datamend_processing::config::{OutlierPolicy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .duplicate_key_columns(["customer_id", "email"])
///     .outlier_policy(OutlierPolicy::Cap)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Strategy for missing values in numeric columns.
    /// Default: Auto (median, mean when not skewed)
    pub numeric_missing_strategy: NumericMissingStrategy,

    /// Strategy for missing values in categorical columns.
    /// Default: Mode
    pub categorical_missing_strategy: CategoricalMissingStrategy,

    /// Constant fill for missing values in email/phone/date columns.
    /// When None, rows with missing format values are dropped.
    /// Default: None
    pub format_missing_default: Option<String>,

    /// Columns with a missing rate above this fraction are dropped entirely
    /// (identifier columns exempt). Default: 0.5
    pub missing_column_threshold: f64,

    /// Absolute skewness at or below which mean imputation is preferred over
    /// median under the Auto strategy. Default: 1.0
    pub skewness_threshold: f64,

    /// Columns forming the duplicate key. Empty means all columns.
    pub duplicate_key_columns: Vec<String>,

    /// Similarity threshold for near-duplicate grouping, in [0, 1].
    /// 1.0 disables fuzzy matching (exact duplicates only). Default: 1.0
    pub duplicate_fuzzy_threshold: f64,

    /// Tie-break for the surviving row of a duplicate group.
    /// Default: FirstOccurrence
    pub survivor_policy: SurvivorPolicy,

    /// Statistical method used to bound numeric outliers.
    /// Default: ModifiedZscore
    pub outlier_method: OutlierMethod,

    /// What to do with values outside the outlier bounds.
    /// Default: Cap
    pub outlier_policy: OutlierPolicy,

    /// Detection threshold; when None the method's default applies
    /// (3.5 for modified z-score, 1.5 for IQR fencing).
    pub outlier_threshold: Option<f64>,

    /// Fraction of non-missing values that must validate as a type for the
    /// profiler to assign it. Default: 0.8
    pub type_inference_threshold: f64,

    /// Canonical strftime format for date columns. Default: "%Y-%m-%d"
    pub date_canonical_format: String,

    /// Canonical phone template with `X` digit placeholders.
    /// Default: "(XXX) XXX-XXXX"
    pub phone_canonical_format: String,

    /// Fail fast before processing when the dataset has more rows than this.
    /// Default: None (unlimited)
    pub max_rows_guard: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            numeric_missing_strategy: NumericMissingStrategy::default(),
            categorical_missing_strategy: CategoricalMissingStrategy::default(),
            format_missing_default: None,
            missing_column_threshold: 0.5,
            skewness_threshold: 1.0,
            duplicate_key_columns: Vec::new(),
            duplicate_fuzzy_threshold: 1.0,
            survivor_policy: SurvivorPolicy::default(),
            outlier_method: OutlierMethod::default(),
            outlier_policy: OutlierPolicy::default(),
            outlier_threshold: None,
            type_inference_threshold: 0.8,
            date_canonical_format: "%Y-%m-%d".to_string(),
            phone_canonical_format: "(XXX) XXX-XXXX".to_string(),
            max_rows_guard: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The effective outlier threshold: configured value or method default.
    pub fn effective_outlier_threshold(&self) -> f64 {
        self.outlier_threshold
            .unwrap_or_else(|| self.outlier_method.default_threshold())
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_column_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_column_threshold".to_string(),
                value: self.missing_column_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.duplicate_fuzzy_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "duplicate_fuzzy_threshold".to_string(),
                value: self.duplicate_fuzzy_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.type_inference_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "type_inference_threshold".to_string(),
                value: self.type_inference_threshold,
            });
        }

        if self.skewness_threshold < 0.0 {
            return Err(ConfigValidationError::NegativeValue {
                field: "skewness_threshold".to_string(),
                value: self.skewness_threshold,
            });
        }

        if let Some(threshold) = self.outlier_threshold
            && threshold <= 0.0
        {
            return Err(ConfigValidationError::NegativeValue {
                field: "outlier_threshold".to_string(),
                value: threshold,
            });
        }

        if !self.phone_canonical_format.contains('X') {
            return Err(ConfigValidationError::InvalidPhoneTemplate(
                self.phone_canonical_format.clone(),
            ));
        }

        if self.max_rows_guard == Some(0) {
            return Err(ConfigValidationError::InvalidMaxRowsGuard);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be positive)")]
    NegativeValue { field: String, value: f64 },

    #[error("Invalid phone template '{0}': must contain at least one 'X' placeholder")]
    InvalidPhoneTemplate(String),

    #[error("max_rows_guard must be at least 1")]
    InvalidMaxRowsGuard,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    numeric_missing_strategy: Option<NumericMissingStrategy>,
    categorical_missing_strategy: Option<CategoricalMissingStrategy>,
    format_missing_default: Option<String>,
    missing_column_threshold: Option<f64>,
    skewness_threshold: Option<f64>,
    duplicate_key_columns: Option<Vec<String>>,
    duplicate_fuzzy_threshold: Option<f64>,
    survivor_policy: Option<SurvivorPolicy>,
    outlier_method: Option<OutlierMethod>,
    outlier_policy: Option<OutlierPolicy>,
    outlier_threshold: Option<f64>,
    type_inference_threshold: Option<f64>,
    date_canonical_format: Option<String>,
    phone_canonical_format: Option<String>,
    max_rows_guard: Option<usize>,
}

impl PipelineConfigBuilder {
    /// Set the strategy for missing values in numeric columns.
    pub fn numeric_missing_strategy(mut self, strategy: NumericMissingStrategy) -> Self {
        self.numeric_missing_strategy = Some(strategy);
        self
    }

    /// Set the strategy for missing values in categorical columns.
    pub fn categorical_missing_strategy(mut self, strategy: CategoricalMissingStrategy) -> Self {
        self.categorical_missing_strategy = Some(strategy);
        self
    }

    /// Fill missing email/phone/date values with this constant instead of
    /// dropping the row.
    pub fn format_missing_default(mut self, value: impl Into<String>) -> Self {
        self.format_missing_default = Some(value.into());
        self
    }

    /// Set the missing-rate fraction above which a column is dropped.
    pub fn missing_column_threshold(mut self, threshold: f64) -> Self {
        self.missing_column_threshold = Some(threshold);
        self
    }

    /// Set the skewness cutoff for the Auto numeric imputation strategy.
    pub fn skewness_threshold(mut self, threshold: f64) -> Self {
        self.skewness_threshold = Some(threshold);
        self
    }

    /// Set the columns that form the duplicate key.
    pub fn duplicate_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.duplicate_key_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the near-duplicate similarity threshold (1.0 disables fuzzy matching).
    pub fn duplicate_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.duplicate_fuzzy_threshold = Some(threshold);
        self
    }

    /// Set the survivor tie-break policy for duplicate groups.
    pub fn survivor_policy(mut self, policy: SurvivorPolicy) -> Self {
        self.survivor_policy = Some(policy);
        self
    }

    /// Set the outlier bound method.
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self
    }

    /// Set the outlier handling policy.
    pub fn outlier_policy(mut self, policy: OutlierPolicy) -> Self {
        self.outlier_policy = Some(policy);
        self
    }

    /// Set the outlier detection threshold.
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Set the fraction of values that must validate for type assignment.
    pub fn type_inference_threshold(mut self, threshold: f64) -> Self {
        self.type_inference_threshold = Some(threshold);
        self
    }

    /// Set the canonical strftime format for date columns.
    pub fn date_canonical_format(mut self, format: impl Into<String>) -> Self {
        self.date_canonical_format = Some(format.into());
        self
    }

    /// Set the canonical phone template (`X` marks a digit).
    pub fn phone_canonical_format(mut self, format: impl Into<String>) -> Self {
        self.phone_canonical_format = Some(format.into());
        self
    }

    /// Fail fast when the dataset exceeds this row count.
    pub fn max_rows_guard(mut self, max_rows: usize) -> Self {
        self.max_rows_guard = Some(max_rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            numeric_missing_strategy: self.numeric_missing_strategy.unwrap_or_default(),
            categorical_missing_strategy: self.categorical_missing_strategy.unwrap_or_default(),
            format_missing_default: self.format_missing_default,
            missing_column_threshold: self.missing_column_threshold.unwrap_or(0.5),
            skewness_threshold: self.skewness_threshold.unwrap_or(1.0),
            duplicate_key_columns: self.duplicate_key_columns.unwrap_or_default(),
            duplicate_fuzzy_threshold: self.duplicate_fuzzy_threshold.unwrap_or(1.0),
            survivor_policy: self.survivor_policy.unwrap_or_default(),
            outlier_method: self.outlier_method.unwrap_or_default(),
            outlier_policy: self.outlier_policy.unwrap_or_default(),
            outlier_threshold: self.outlier_threshold,
            type_inference_threshold: self.type_inference_threshold.unwrap_or(0.8),
            date_canonical_format: self
                .date_canonical_format
                .unwrap_or_else(|| "%Y-%m-%d".to_string()),
            phone_canonical_format: self
                .phone_canonical_format
                .unwrap_or_else(|| "(XXX) XXX-XXXX".to_string()),
            max_rows_guard: self.max_rows_guard,
        };

        config.validate()?;
        Ok(config)
    }
}
