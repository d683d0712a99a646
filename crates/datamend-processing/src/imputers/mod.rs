//! Missing-value resolution.
//!
//! Works from a single input snapshot: fill values are derived, corrections
//! are logged against snapshot row indices, and row drops are applied in one
//! filter at the end. Postcondition: no missing values remain in surviving
//! columns.

mod statistical;

use polars::prelude::*;
use tracing::{info, warn};

use crate::config::{CategoricalMissingStrategy, PipelineConfig};
use crate::error::Result;
use crate::types::{
    ColumnType, Correction, CorrectionLog, CorrectionRule, DatasetProfile,
};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_mode};

use statistical::numeric_fill_value;

/// Resolves missing values per column according to the column's inferred type
/// and the configured strategies.
pub struct MissingValueResolver;

impl MissingValueResolver {
    /// Resolve missing values across the whole frame.
    ///
    /// Order of operations: drop columns whose missing rate exceeds the
    /// threshold, mark rows with missing identifier values for removal, fill
    /// or mark the remaining columns, then apply all row removals at once.
    pub fn resolve(
        df: DataFrame,
        profile: &DatasetProfile,
        config: &PipelineConfig,
        log: &mut CorrectionLog,
    ) -> Result<DataFrame> {
        let mut df = Self::drop_high_missing_columns(df, profile, config, log)?;
        let mut keep = vec![true; df.height()];

        let remaining: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        for col_name in &remaining {
            let column_type = profile
                .column(col_name)
                .map(|p| p.inferred_type)
                .unwrap_or(ColumnType::Unknown);
            let series = df.column(col_name)?.as_materialized_series().clone();
            if series.null_count() == 0 {
                continue;
            }

            match column_type {
                ColumnType::Identifier => {
                    Self::mark_null_rows(
                        &series,
                        col_name,
                        CorrectionRule::RowDroppedMissingKey,
                        &mut keep,
                        log,
                    );
                }
                ColumnType::Numeric => {
                    Self::resolve_numeric(&mut df, &series, col_name, config, &mut keep, log)?;
                }
                ColumnType::Categorical => {
                    Self::resolve_categorical(&mut df, &series, col_name, config, &mut keep, log)?;
                }
                ColumnType::Email | ColumnType::Phone | ColumnType::Date => {
                    match &config.format_missing_default {
                        Some(default) => {
                            Self::fill_string_column(
                                &mut df,
                                &series,
                                col_name,
                                default,
                                CorrectionRule::ConstantFill,
                                log,
                            )?;
                        }
                        None => Self::mark_null_rows(
                            &series,
                            col_name,
                            CorrectionRule::RowDroppedMissing,
                            &mut keep,
                            log,
                        ),
                    }
                }
                ColumnType::Unknown => {
                    // Below-threshold column with nothing usable in it.
                    warn!(column = %col_name, "column typed unknown still has nulls");
                }
            }
        }

        let removed = keep.iter().filter(|&&k| !k).count();
        if removed > 0 {
            info!(removed, "dropped rows with unresolvable missing values");
            let mask = BooleanChunked::from_slice("keep".into(), &keep);
            df = df.filter(&mask)?;
        }

        Ok(df)
    }

    /// Drop columns whose missing rate exceeds the configured threshold.
    /// Identifier columns are exempt.
    fn drop_high_missing_columns(
        df: DataFrame,
        profile: &DatasetProfile,
        config: &PipelineConfig,
        log: &mut CorrectionLog,
    ) -> Result<DataFrame> {
        let present: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let to_drop: Vec<&crate::types::ColumnProfile> = profile
            .column_profiles
            .iter()
            .filter(|p| {
                p.inferred_type != ColumnType::Identifier
                    && p.missing_percentage / 100.0 > config.missing_column_threshold
                    && present.contains(&p.name)
            })
            .collect();

        if to_drop.is_empty() {
            return Ok(df);
        }

        for col_profile in &to_drop {
            info!(
                column = %col_profile.name,
                missing_pct = col_profile.missing_percentage,
                "dropping high-missing column"
            );
            log.push(
                Correction::column_level(col_profile.name.clone(), CorrectionRule::ColumnDropped)
                    .with_values(
                        Some(format!("{:.1}% missing", col_profile.missing_percentage)),
                        None,
                    ),
            );
        }

        let names: Vec<PlSmallStr> = to_drop.iter().map(|p| p.name.as_str().into()).collect();
        Ok(df.drop_many(names))
    }

    fn resolve_numeric(
        df: &mut DataFrame,
        series: &Series,
        col_name: &str,
        config: &PipelineConfig,
        keep: &mut [bool],
        log: &mut CorrectionLog,
    ) -> Result<()> {
        match numeric_fill_value(series, config.numeric_missing_strategy, config.skewness_threshold)?
        {
            Some((value, rule)) => {
                let null_mask = series.is_null();
                for row in 0..series.len() {
                    if null_mask.get(row).unwrap_or(false) {
                        log.push(
                            Correction::new(row, col_name, rule)
                                .with_values(None, Some(value.to_string())),
                        );
                    }
                }
                let filled = fill_numeric_nulls(series, value)?;
                df.replace(col_name, filled)?;
            }
            None => {
                Self::mark_null_rows(
                    series,
                    col_name,
                    CorrectionRule::RowDroppedMissing,
                    keep,
                    log,
                );
            }
        }
        Ok(())
    }

    fn resolve_categorical(
        df: &mut DataFrame,
        series: &Series,
        col_name: &str,
        config: &PipelineConfig,
        keep: &mut [bool],
        log: &mut CorrectionLog,
    ) -> Result<()> {
        match config.categorical_missing_strategy {
            CategoricalMissingStrategy::Mode => {
                if let Some(mode) = string_mode(series) {
                    Self::fill_string_column(
                        df,
                        series,
                        col_name,
                        &mode,
                        CorrectionRule::ModeImputation,
                        log,
                    )?;
                } else {
                    Self::mark_null_rows(
                        series,
                        col_name,
                        CorrectionRule::RowDroppedMissing,
                        keep,
                        log,
                    );
                }
            }
            CategoricalMissingStrategy::ForwardFill => {
                let filled = series.fill_null(FillNullStrategy::Forward(None))?;
                // Leading nulls have nothing to carry forward; fall back to mode.
                let filled = match string_mode(series) {
                    Some(mode) if filled.null_count() > 0 => fill_string_nulls(&filled, &mode)?,
                    _ => filled,
                };
                let null_mask = series.is_null();
                for row in 0..series.len() {
                    if null_mask.get(row).unwrap_or(false) {
                        let new_value = crate::utils::cell_to_string(&filled, row);
                        log.push(
                            Correction::new(row, col_name, CorrectionRule::ForwardFill)
                                .with_values(None, new_value),
                        );
                    }
                }
                df.replace(col_name, filled)?;
            }
            CategoricalMissingStrategy::Drop => {
                Self::mark_null_rows(
                    series,
                    col_name,
                    CorrectionRule::RowDroppedMissing,
                    keep,
                    log,
                );
            }
        }
        Ok(())
    }

    fn fill_string_column(
        df: &mut DataFrame,
        series: &Series,
        col_name: &str,
        fill_value: &str,
        rule: CorrectionRule,
        log: &mut CorrectionLog,
    ) -> Result<()> {
        let null_mask = series.is_null();
        for row in 0..series.len() {
            if null_mask.get(row).unwrap_or(false) {
                log.push(
                    Correction::new(row, col_name, rule)
                        .with_values(None, Some(fill_value.to_string())),
                );
            }
        }
        let filled = fill_string_nulls(series, fill_value)?;
        df.replace(col_name, filled)?;
        Ok(())
    }

    fn mark_null_rows(
        series: &Series,
        col_name: &str,
        rule: CorrectionRule,
        keep: &mut [bool],
        log: &mut CorrectionLog,
    ) {
        let null_mask = series.is_null();
        for (row, keep_row) in keep.iter_mut().enumerate() {
            if null_mask.get(row).unwrap_or(false) && *keep_row {
                *keep_row = false;
                log.push(Correction::new(row, col_name, rule));
            }
        }
    }
}
