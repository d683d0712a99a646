//! End-to-end tests for the remediation pipeline.

use polars::prelude::*;
use pretty_assertions::assert_eq;

use datamend_processing::{
    CorrectionRule, Pipeline, PipelineConfig, SurvivorPolicy, detect_duplicate_groups,
};

/// Customer records with one of everything: a missing age, a missing city
/// (as a textual marker), a duplicate customer id, an income outlier, and
/// non-canonical email/phone/date values.
fn messy_customers() -> DataFrame {
    df! {
        "customer_id" => &[
            "C001", "C002", "C003", "C004", "C005",
            "C005", "C006", "C007", "C008", "C009",
        ],
        "age" => &[
            Some(25i64), Some(34), None, Some(29), Some(41),
            Some(41), Some(38), Some(27), Some(33), Some(30),
        ],
        "income" => &[
            52000.0f64, 61000.0, 48000.0, 55000.0, 58000.0,
            58000.0, 1_000_000.0, 50000.0, 53000.0, 51000.0,
        ],
        "email" => &[
            "a@example.com", " B@Example.COM ", "c@mail.net", "d@example.com", "e@test.org",
            "e@test.org", "bad-email", "g@example.com", "h@mail.net", "i@test.org",
        ],
        "phone" => &[
            "555-123-4567", "(555) 987-6543", "555.222.3333", "5554445555", "555-666-7777",
            "555-666-7777", "555-888-9999", "1-555-111-2222", "555-333-4444", "555-777-8888",
        ],
        "city" => &[
            "Austin", "Boston", "Austin", "N/A", "Denver",
            "Denver", "Austin", "Boston", "Austin", "Denver",
        ],
        "signup_date" => &[
            "2024-01-15", "01/20/2024", "2024-02-01", "2024-02-10", "2024-03-05",
            "2024-03-05", "2024-03-12", "02/28/2024", "2024-04-01", "2024-04-15",
        ],
    }
    .unwrap()
}

fn run_default(df: DataFrame) -> datamend_processing::PipelineResult {
    let config = PipelineConfig::builder()
        .duplicate_key_columns(["customer_id"])
        .build()
        .unwrap();
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(df)
        .unwrap()
}

#[test]
fn end_to_end_improves_score() {
    let result = run_default(messy_customers());

    assert!(
        result.final_report.score > result.baseline_report.score,
        "expected improvement, got {:.2} -> {:.2}",
        result.baseline_report.score,
        result.final_report.score
    );
    assert!(result.improvement() > 0.0);
}

#[test]
fn end_to_end_resolves_every_issue_class() {
    let result = run_default(messy_customers());

    // One duplicate customer id removed.
    assert_eq!(result.cleaned.height(), 9);
    assert_eq!(result.final_report.duplicate_rows, 0);
    assert_eq!(
        result.correction_log.count_rule(CorrectionRule::DuplicateRemoved),
        1
    );

    // Missing age and the "N/A" city marker both resolved.
    assert_eq!(result.final_report.missing_cells, 0);
    for col in result.cleaned.get_columns() {
        assert_eq!(
            col.null_count(),
            0,
            "column {} still has nulls",
            col.name()
        );
    }

    // The million-dollar income was capped, not dropped.
    assert_eq!(
        result.correction_log.count_rule(CorrectionRule::OutlierCapped),
        1
    );
    let max_income = result
        .cleaned
        .column("income")
        .unwrap()
        .f64()
        .unwrap()
        .max()
        .unwrap();
    assert!(max_income < 1_000_000.0);

    // Formats canonicalized.
    assert!(result.correction_log.count_rule(CorrectionRule::EmailNormalized) >= 1);
    assert!(result.correction_log.count_rule(CorrectionRule::PhoneNormalized) >= 1);
    assert!(result.correction_log.count_rule(CorrectionRule::DateNormalized) >= 1);
}

#[test]
fn email_canonicalization_worked_example() {
    let result = run_default(messy_customers());

    let email = result.cleaned.column("email").unwrap().str().unwrap();
    let canonical: Vec<&str> = email.into_iter().flatten().collect();
    assert!(canonical.contains(&"b@example.com"));
    // Unrecognizable values are never invented into something else.
    assert!(canonical.contains(&"bad-email"));
}

#[test]
fn phone_and_date_canonical_forms() {
    let result = run_default(messy_customers());

    let phone = result.cleaned.column("phone").unwrap().str().unwrap();
    for val in phone.into_iter().flatten() {
        assert!(
            val.starts_with('(') && val.len() == 14,
            "phone not canonical: {val}"
        );
    }

    let dates = result.cleaned.column("signup_date").unwrap().str().unwrap();
    for val in dates.into_iter().flatten() {
        assert_eq!(val.len(), 10);
        assert_eq!(&val[4..5], "-");
    }
}

#[test]
fn outlier_capped_at_modified_zscore_bound() {
    // median 3, MAD 1: upper bound = 3 + 3.5 * 1 / 0.6745
    let df = df! {
        "amount" => &[1.0f64, 2.0, 3.0, 4.0, 1000.0],
    }
    .unwrap();

    let result = Pipeline::builder().build().unwrap().process(df).unwrap();

    assert_eq!(result.cleaned.height(), 5);
    let max = result
        .cleaned
        .column("amount")
        .unwrap()
        .f64()
        .unwrap()
        .max()
        .unwrap();
    assert!((max - (3.0 + 3.5 / 0.6745)).abs() < 1e-9);
    assert_eq!(
        result.correction_log.count_rule(CorrectionRule::OutlierCapped),
        1
    );
}

#[test]
fn most_complete_survivor_worked_example() {
    let df = df! {
        "name" => &["John Smith", "john smith"],
        "phone" => &[None::<&str>, Some("555-123-4567")],
    }
    .unwrap();

    let config = PipelineConfig::builder()
        .duplicate_key_columns(["name"])
        .survivor_policy(SurvivorPolicy::MostComplete)
        .build()
        .unwrap();

    let groups = detect_duplicate_groups(&df, &config).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].rows, vec![0, 1]);
    assert_eq!(groups[0].survivor, 1);
}

#[test]
fn most_complete_survivor_judged_before_imputation() {
    // Row 0 is missing its plan; imputation fills it before dedup runs. The
    // survivor pick must still reflect the original gap, so row 1 wins even
    // though both rows look equally complete by then.
    let df = df! {
        "name" => &["alice smith", "alice smith", "bob jones"],
        "city" => &["austin", "austin", "denver"],
        "plan" => &[None::<&str>, Some("silver"), Some("gold")],
    }
    .unwrap();

    let config = PipelineConfig::builder()
        .duplicate_key_columns(["name", "city"])
        .survivor_policy(SurvivorPolicy::MostComplete)
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(df)
        .unwrap();

    assert_eq!(result.cleaned.height(), 2);
    let plan = result.cleaned.column("plan").unwrap().str().unwrap();
    let plans: Vec<&str> = plan.into_iter().flatten().collect();
    assert_eq!(plans, vec!["silver", "gold"]);

    let removal = result
        .correction_log
        .entries
        .iter()
        .find(|entry| entry.rule == CorrectionRule::DuplicateRemoved)
        .unwrap();
    assert_eq!(removal.row, Some(0));
    assert_eq!(removal.survivor, Some(1));
}

#[test]
fn duplicate_detection_is_deterministic() {
    let df = messy_customers();
    let config = PipelineConfig::builder()
        .duplicate_key_columns(["customer_id"])
        .build()
        .unwrap();

    let first = detect_duplicate_groups(&df, &config).unwrap();
    let second = detect_duplicate_groups(&df, &config).unwrap();
    assert_eq!(first, second);

    // Groups are disjoint.
    let mut seen = std::collections::HashSet::new();
    for group in &first {
        for &row in &group.rows {
            assert!(seen.insert(row), "row {row} appears in two groups");
        }
        assert!(group.rows.contains(&group.survivor));
    }
}

#[test]
fn clean_dataset_passes_through_unchanged() {
    let df = df! {
        "name" => &["alice", "bob", "carol"],
        "age" => &[25.0f64, 34.0, 29.0],
        "email" => &["a@example.com", "b@test.org", "c@mail.net"],
    }
    .unwrap();

    let result = Pipeline::builder()
        .build()
        .unwrap()
        .process(df.clone())
        .unwrap();

    assert!(result.cleaned.equals_missing(&df));
    assert!(result.correction_log.is_empty());
    assert!((result.final_report.score - 100.0).abs() < 1e-9);
    assert_eq!(result.final_report.score, result.baseline_report.score);
}

#[test]
fn empty_dataset_is_a_noop_scoring_100() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .process(DataFrame::empty())
        .unwrap();

    assert_eq!(result.cleaned.height(), 0);
    assert!((result.baseline_report.score - 100.0).abs() < 1e-9);
    assert!((result.final_report.score - 100.0).abs() < 1e-9);
    assert!(result.correction_log.is_empty());
    assert_eq!(result.summary.rows_removed, 0);
}

#[test]
fn remove_policy_drops_outlier_rows() {
    let df = df! {
        "amount" => &[1.0f64, 2.0, 3.0, 4.0, 1000.0],
    }
    .unwrap();

    let config = PipelineConfig::builder()
        .outlier_policy(datamend_processing::OutlierPolicy::Remove)
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(df)
        .unwrap();

    assert_eq!(result.cleaned.height(), 4);
    assert_eq!(
        result.correction_log.count_rule(CorrectionRule::OutlierRemoved),
        1
    );
}

#[test]
fn correction_log_serializes_for_audit() {
    let result = run_default(messy_customers());

    let json = serde_json::to_string_pretty(&result.correction_log).unwrap();
    assert!(json.contains("duplicate_removed"));
    assert!(json.contains("outlier_capped"));

    let roundtrip: datamend_processing::CorrectionLog = serde_json::from_str(&json).unwrap();
    assert_eq!(roundtrip.len(), result.correction_log.len());
}

#[test]
fn summary_tracks_shape_and_corrections() {
    let result = run_default(messy_customers());

    assert_eq!(result.summary.rows_before, 10);
    assert_eq!(result.summary.rows_after, 9);
    assert_eq!(result.summary.rows_removed, 1);
    assert_eq!(result.summary.columns_before, 7);
    assert_eq!(result.summary.columns_after, 7);
    assert_eq!(
        result.summary.corrections_applied,
        result.correction_log.len()
    );
    assert!(!result.summary.actions.is_empty());
}
