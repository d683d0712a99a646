//! Duplicate detection and resolution.
//!
//! Detection is shared: the quality assessor calls it read-only to count
//! duplicate rows, and the resolver uses the same grouping to decide which
//! rows to remove. Both therefore always agree on what counts as a duplicate.

mod normalize;
mod sanitize;

pub(crate) use sanitize::sanitize_missing_markers;

use std::collections::HashMap;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::{PipelineConfig, SurvivorPolicy};
use crate::error::{CleaningError, Result};
use crate::types::{Correction, CorrectionLog, CorrectionRule, DuplicateGroup};
use crate::utils::cell_to_string;

use normalize::{normalize_key, similarity};

/// Detect groups of duplicate rows under the configured key.
///
/// Rows compare equal when their normalized key values match; with a fuzzy
/// threshold below 1.0, near-matching keys are merged into the same group.
/// Returned groups are disjoint, contain at least two rows each, and are
/// ordered by their earliest row index.
///
/// Under the `MostComplete` survivor policy, completeness is measured on the
/// frame as given; callers holding pre-imputation missing counts should use
/// [`detect_duplicate_groups_with`].
pub fn detect_duplicate_groups(
    df: &DataFrame,
    config: &PipelineConfig,
) -> Result<Vec<DuplicateGroup>> {
    detect_duplicate_groups_with(df, config, None)
}

/// Like [`detect_duplicate_groups`], with explicit per-row missing counts for
/// the `MostComplete` survivor tie-break. Needed after imputation has run,
/// when the frame itself no longer shows which cells were originally missing.
pub(crate) fn detect_duplicate_groups_with(
    df: &DataFrame,
    config: &PipelineConfig,
    original_missing: Option<&[usize]>,
) -> Result<Vec<DuplicateGroup>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let keys = row_keys(df, &config.duplicate_key_columns)?;

    // Exact grouping on the normalized key, preserving first-seen order.
    let mut key_order: Vec<String> = Vec::new();
    let mut exact_groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        exact_groups
            .entry(key.clone())
            .or_insert_with(|| {
                key_order.push(key.clone());
                Vec::new()
            })
            .push(row);
    }

    // With fuzzy matching enabled, merge clusters whose keys are close enough.
    let clusters: Vec<Vec<usize>> = if config.duplicate_fuzzy_threshold < 1.0 {
        let mut cluster_keys: Vec<String> = Vec::new();
        let mut clusters: Vec<Vec<usize>> = Vec::new();

        for key in &key_order {
            let rows = &exact_groups[key];
            let matched = cluster_keys.iter().position(|existing| {
                key_similarity(existing, key) >= config.duplicate_fuzzy_threshold
            });
            match matched {
                Some(idx) => clusters[idx].extend_from_slice(rows),
                None => {
                    cluster_keys.push(key.clone());
                    clusters.push(rows.clone());
                }
            }
        }
        clusters
    } else {
        key_order
            .iter()
            .map(|key| exact_groups[key].clone())
            .collect()
    };

    let missing_counts = match config.survivor_policy {
        SurvivorPolicy::MostComplete => Some(match original_missing {
            Some(counts) => counts.to_vec(),
            None => row_missing_counts(df),
        }),
        SurvivorPolicy::FirstOccurrence => None,
    };

    let mut groups: Vec<DuplicateGroup> = clusters
        .into_iter()
        .filter(|rows| rows.len() >= 2)
        .map(|mut rows| {
            rows.sort_unstable();
            let survivor = choose_survivor(&rows, missing_counts.as_deref());
            DuplicateGroup { rows, survivor }
        })
        .collect();
    groups.sort_by_key(|g| g.rows[0]);

    Ok(groups)
}

/// Mean per-column similarity between two composed keys.
fn key_similarity(a: &str, b: &str) -> f64 {
    let a_parts: Vec<&str> = a.split('\u{1f}').collect();
    let b_parts: Vec<&str> = b.split('\u{1f}').collect();
    if a_parts.len() != b_parts.len() || a_parts.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }
    let total: f64 = a_parts
        .iter()
        .zip(&b_parts)
        .map(|(pa, pb)| similarity(pa, pb))
        .sum();
    total / a_parts.len() as f64
}

/// Build a normalized comparison key per row from the configured key columns
/// (all columns when none are configured). Missing cells become empty tokens.
fn row_keys(df: &DataFrame, key_columns: &[String]) -> Result<Vec<String>> {
    let columns: Vec<Series> = if key_columns.is_empty() {
        df.get_columns()
            .iter()
            .map(|c| c.as_materialized_series().clone())
            .collect()
    } else {
        let mut selected = Vec::with_capacity(key_columns.len());
        for name in key_columns {
            let col = df
                .column(name)
                .map_err(|_| CleaningError::ColumnNotFound(name.clone()))?;
            selected.push(col.as_materialized_series().clone());
        }
        selected
    };

    let mut keys = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut parts = Vec::with_capacity(columns.len());
        for series in &columns {
            let part = cell_to_string(series, row)
                .map(|v| normalize_key(&v))
                .unwrap_or_default();
            parts.push(part);
        }
        keys.push(parts.join("\u{1f}"));
    }
    Ok(keys)
}

/// Missing cells per row, across all columns.
pub(crate) fn row_missing_counts(df: &DataFrame) -> Vec<usize> {
    let mut counts = vec![0usize; df.height()];
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let null_mask = series.is_null();
        for (row, count) in counts.iter_mut().enumerate() {
            if null_mask.get(row).unwrap_or(false) {
                *count += 1;
            }
        }
    }
    counts
}

/// Pick the surviving row of a sorted duplicate group.
fn choose_survivor(rows: &[usize], missing_counts: Option<&[usize]>) -> usize {
    match missing_counts {
        // Fewest missing cells wins; min_by_key keeps the earliest on ties.
        Some(counts) => rows
            .iter()
            .copied()
            .min_by_key(|&row| counts[row])
            .unwrap_or(rows[0]),
        None => rows[0],
    }
}

/// Removes duplicate rows, keeping one survivor per group.
pub struct DuplicateResolver;

impl DuplicateResolver {
    /// Resolve duplicates: detect groups, keep each group's survivor, drop
    /// the rest, and record one correction per removed row.
    ///
    /// `original_missing` carries per-row missing counts from before
    /// imputation, so the `MostComplete` tie-break ranks rows by their
    /// original completeness rather than the filled frame's.
    pub fn resolve(
        df: DataFrame,
        config: &PipelineConfig,
        original_missing: Option<&[usize]>,
        log: &mut CorrectionLog,
    ) -> Result<DataFrame> {
        let groups = detect_duplicate_groups_with(&df, config, original_missing)?;
        if groups.is_empty() {
            debug!("no duplicate rows found");
            return Ok(df);
        }

        let mut keep = vec![true; df.height()];
        for group in &groups {
            for &row in &group.rows {
                if row != group.survivor {
                    keep[row] = false;
                    log.push(
                        Correction::new(row, "row", CorrectionRule::DuplicateRemoved)
                            .with_survivor(group.survivor),
                    );
                }
            }
        }

        let removed = keep.iter().filter(|&&k| !k).count();
        info!(groups = groups.len(), removed, "resolved duplicate rows");

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }
}
