use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic type of a column, decided once by the schema profiler and passed
/// explicitly to every downstream stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Email,
    Phone,
    Date,
    Identifier,
    /// Column with no non-missing values; excluded from numeric and format checks.
    Unknown,
}

impl ColumnType {
    /// Format-typed columns are standardized and checked against a canonical grammar.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Email | Self::Phone | Self::Date)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Date => "date",
            Self::Identifier => "identifier",
            Self::Unknown => "unknown",
        }
    }
}

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
    pub skewness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub inferred_type: ColumnType,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub distinct_count: usize,
    pub sample_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    pub duplicate_count: usize,
    pub duplicate_percentage: f64,
}

impl DatasetProfile {
    /// Look up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }
}

/// Per-issue counts and rates plus the aggregate quality score.
///
/// The score formula is fixed so baseline and final reports are directly
/// comparable: `100 * sum(w_i * (1 - rate_i))` with weights summing to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub timestamp: DateTime<Utc>,
    pub total_rows: usize,
    pub total_columns: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    pub outlier_values: usize,
    pub malformed_values: usize,
    pub missing_rate: f64,
    pub duplicate_rate: f64,
    pub outlier_rate: f64,
    pub malformed_rate: f64,
    /// Aggregate quality score in [0, 100].
    pub score: f64,
}

impl QualityReport {
    pub fn total_issues(&self) -> usize {
        self.missing_cells + self.duplicate_rows + self.outlier_values + self.malformed_values
    }
}

/// A group of row indices considered equivalent under the duplicate key.
///
/// Groups are disjoint; exactly one member survives remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Row indices in the group, in original row order.
    pub rows: Vec<usize>,
    /// The row kept after remediation, chosen by the configured tie-break.
    pub survivor: usize,
}

/// The rule that produced a correction, for audit and explainability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionRule {
    MeanImputation,
    MedianImputation,
    ModeImputation,
    ForwardFill,
    ConstantFill,
    RowDroppedMissingKey,
    RowDroppedMissing,
    ColumnDropped,
    DuplicateRemoved,
    OutlierCapped,
    OutlierRemoved,
    OutlierFlagged,
    EmailNormalized,
    PhoneNormalized,
    DateNormalized,
}

impl CorrectionRule {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MeanImputation => "Mean Imputation",
            Self::MedianImputation => "Median Imputation",
            Self::ModeImputation => "Mode Imputation",
            Self::ForwardFill => "Forward Fill",
            Self::ConstantFill => "Constant Fill",
            Self::RowDroppedMissingKey => "Row Dropped (missing identifier)",
            Self::RowDroppedMissing => "Row Dropped (missing value)",
            Self::ColumnDropped => "Column Dropped (high missing rate)",
            Self::DuplicateRemoved => "Duplicate Removed",
            Self::OutlierCapped => "Outlier Capped",
            Self::OutlierRemoved => "Outlier Removed",
            Self::OutlierFlagged => "Outlier Flagged",
            Self::EmailNormalized => "Email Normalized",
            Self::PhoneNormalized => "Phone Normalized",
            Self::DateNormalized => "Date Normalized",
        }
    }
}

/// One applied correction: which cell changed, from what to what, and why.
///
/// Row indices refer to the acting stage's input snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    /// Row index, or `None` for corrections affecting a whole column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Column name, or "row" for whole-row removals.
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub rule: CorrectionRule,
    /// For duplicate removals, the index of the surviving row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survivor: Option<usize>,
}

impl Correction {
    pub fn new(row: usize, column: impl Into<String>, rule: CorrectionRule) -> Self {
        Self {
            row: Some(row),
            column: column.into(),
            old_value: None,
            new_value: None,
            rule,
            survivor: None,
        }
    }

    /// A correction affecting a whole column rather than a single cell.
    pub fn column_level(column: impl Into<String>, rule: CorrectionRule) -> Self {
        Self {
            row: None,
            column: column.into(),
            old_value: None,
            new_value: None,
            rule,
            survivor: None,
        }
    }

    pub fn with_values(
        mut self,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn with_survivor(mut self, survivor: usize) -> Self {
        self.survivor = Some(survivor);
        self
    }
}

/// Ordered sequence of applied corrections, accumulated across all stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionLog {
    pub entries: Vec<Correction>,
}

impl CorrectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, correction: Correction) {
        self.entries.push(correction);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries recorded under a given rule.
    pub fn count_rule(&self, rule: CorrectionRule) -> usize {
        self.entries.iter().filter(|c| c.rule == rule).count()
    }
}

/// Human-readable summary of a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub duration_ms: u64,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub corrections_applied: usize,
    /// One line per notable stage action.
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f64 / self.rows_before as f64) * 100.0
        }
    }
}

/// Everything a pipeline run produces: the remediated data, the before/after
/// quality reports, and the audit trail.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub cleaned: polars::prelude::DataFrame,
    pub profile: DatasetProfile,
    pub baseline_report: QualityReport,
    pub final_report: QualityReport,
    pub correction_log: CorrectionLog,
    pub summary: CleaningSummary,
}

impl PipelineResult {
    /// Score improvement from baseline to final assessment.
    pub fn improvement(&self) -> f64 {
        self.final_report.score - self.baseline_report.score
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_is_format() {
        assert!(ColumnType::Email.is_format());
        assert!(ColumnType::Phone.is_format());
        assert!(ColumnType::Date.is_format());
        assert!(!ColumnType::Numeric.is_format());
        assert!(!ColumnType::Identifier.is_format());
    }

    #[test]
    fn test_column_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ColumnType::Numeric).unwrap(),
            "\"numeric\""
        );
        assert_eq!(
            serde_json::to_string(&ColumnType::Identifier).unwrap(),
            "\"identifier\""
        );
    }

    #[test]
    fn test_correction_builder() {
        let correction = Correction::new(3, "email", CorrectionRule::EmailNormalized)
            .with_values(
                Some("  John@EXAMPLE.com ".to_string()),
                Some("john@example.com".to_string()),
            );

        assert_eq!(correction.row, Some(3));
        assert_eq!(correction.column, "email");
        assert_eq!(correction.rule, CorrectionRule::EmailNormalized);
        assert_eq!(correction.new_value.as_deref(), Some("john@example.com"));
        assert!(correction.survivor.is_none());
    }

    #[test]
    fn test_column_level_correction_has_no_row() {
        let correction = Correction::column_level("notes", CorrectionRule::ColumnDropped)
            .with_values(Some("75.0% missing".to_string()), None);

        assert_eq!(correction.row, None);
        assert_eq!(correction.column, "notes");
        let json = serde_json::to_value(&correction).unwrap();
        assert!(json.get("row").is_none());
    }

    #[test]
    fn test_correction_log_count_rule() {
        let mut log = CorrectionLog::new();
        log.push(Correction::new(0, "age", CorrectionRule::MedianImputation));
        log.push(Correction::new(1, "age", CorrectionRule::MedianImputation));
        log.push(Correction::new(2, "row", CorrectionRule::DuplicateRemoved).with_survivor(0));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_rule(CorrectionRule::MedianImputation), 2);
        assert_eq!(log.count_rule(CorrectionRule::DuplicateRemoved), 1);
        assert_eq!(log.count_rule(CorrectionRule::OutlierCapped), 0);
    }

    #[test]
    fn test_correction_rule_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CorrectionRule::DuplicateRemoved).unwrap(),
            "\"duplicate_removed\""
        );
        assert_eq!(
            serde_json::to_string(&CorrectionRule::RowDroppedMissingKey).unwrap(),
            "\"row_dropped_missing_key\""
        );
    }

    #[test]
    fn test_correction_log_serialization_roundtrip() {
        let mut log = CorrectionLog::new();
        log.push(
            Correction::new(5, "phone", CorrectionRule::PhoneNormalized).with_values(
                Some("555.123.4567".to_string()),
                Some("(555) 123-4567".to_string()),
            ),
        );

        let json = serde_json::to_string(&log).unwrap();
        let deserialized: CorrectionLog = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.entries[0].row, Some(5));
        assert_eq!(deserialized.entries[0].rule, CorrectionRule::PhoneNormalized);
    }

    #[test]
    fn test_cleaning_summary_percentages() {
        let mut summary = CleaningSummary::new();
        summary.rows_before = 100;
        summary.rows_after = 90;
        summary.rows_removed = 10;

        assert!((summary.rows_removed_percentage() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_cleaning_summary_zero_rows() {
        let summary = CleaningSummary::new();
        assert_eq!(summary.rows_removed_percentage(), 0.0);
    }
}
