//! Human-readable report rendering.

use std::fmt::Write as _;

use crate::types::{CorrectionRule, PipelineResult, QualityReport};

/// Renders pipeline results as plain-text reports.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render a full before/after report for a pipeline run.
    pub fn render(result: &PipelineResult) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "DATA QUALITY REPORT");
        let _ = writeln!(out, "===================");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Rows:    {} -> {} ({} removed)",
            result.summary.rows_before, result.summary.rows_after, result.summary.rows_removed
        );
        let _ = writeln!(
            out,
            "Columns: {} -> {}",
            result.summary.columns_before, result.summary.columns_after
        );
        let _ = writeln!(out, "Duration: {} ms", result.summary.duration_ms);
        let _ = writeln!(out);

        let _ = writeln!(out, "Baseline assessment");
        let _ = writeln!(out, "-------------------");
        Self::render_report(&mut out, &result.baseline_report);
        let _ = writeln!(out);

        let _ = writeln!(out, "Final assessment");
        let _ = writeln!(out, "----------------");
        Self::render_report(&mut out, &result.final_report);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Score improvement: {:+.1}",
            result.improvement()
        );
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "Corrections applied: {}",
            result.correction_log.len()
        );
        for rule in CORRECTION_RULES {
            let count = result.correction_log.count_rule(rule);
            if count > 0 {
                let _ = writeln!(out, "  {:<35} {}", rule.display_name(), count);
            }
        }

        if !result.summary.actions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Actions");
            let _ = writeln!(out, "-------");
            for action in &result.summary.actions {
                let _ = writeln!(out, "  - {}", action);
            }
        }

        if !result.summary.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Warnings");
            let _ = writeln!(out, "--------");
            for warning in &result.summary.warnings {
                let _ = writeln!(out, "  ! {}", warning);
            }
        }

        out
    }

    fn render_report(out: &mut String, report: &QualityReport) {
        let _ = writeln!(out, "  Score: {:.1} / 100", report.score);
        let _ = writeln!(
            out,
            "  Missing cells:    {:>6}  ({:.1}%)",
            report.missing_cells,
            report.missing_rate * 100.0
        );
        let _ = writeln!(
            out,
            "  Duplicate rows:   {:>6}  ({:.1}%)",
            report.duplicate_rows,
            report.duplicate_rate * 100.0
        );
        let _ = writeln!(
            out,
            "  Outlier values:   {:>6}  ({:.1}%)",
            report.outlier_values,
            report.outlier_rate * 100.0
        );
        let _ = writeln!(
            out,
            "  Malformed values: {:>6}  ({:.1}%)",
            report.malformed_values,
            report.malformed_rate * 100.0
        );
    }
}

// Rendering order for the per-rule correction counts.
const CORRECTION_RULES: [CorrectionRule; 15] = [
    CorrectionRule::MeanImputation,
    CorrectionRule::MedianImputation,
    CorrectionRule::ModeImputation,
    CorrectionRule::ForwardFill,
    CorrectionRule::ConstantFill,
    CorrectionRule::RowDroppedMissingKey,
    CorrectionRule::RowDroppedMissing,
    CorrectionRule::ColumnDropped,
    CorrectionRule::DuplicateRemoved,
    CorrectionRule::OutlierCapped,
    CorrectionRule::OutlierRemoved,
    CorrectionRule::OutlierFlagged,
    CorrectionRule::EmailNormalized,
    CorrectionRule::PhoneNormalized,
    CorrectionRule::DateNormalized,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pipeline;
    use polars::prelude::*;

    #[test]
    fn test_render_contains_scores_and_counts() {
        let df = df! {
            "name" => &[Some("alice"), Some("bob"), None, Some("alice")],
            "city" => &[Some("Austin"), Some("Boston"), Some("Denver"), Some("Austin")],
        }
        .unwrap();

        let pipeline = Pipeline::builder().build().unwrap();
        let result = pipeline.process(df).unwrap();
        let text = ReportGenerator::render(&result);

        assert!(text.contains("DATA QUALITY REPORT"));
        assert!(text.contains("Baseline assessment"));
        assert!(text.contains("Final assessment"));
        assert!(text.contains("Score improvement"));
        assert!(text.contains("Corrections applied"));
    }
}
