//! Schema profiling for incoming datasets.
//!
//! The profiler is the single source of truth for column types: it runs once
//! at the start of a pipeline and every downstream stage receives its
//! `DatasetProfile` rather than re-inferring types after mutations.

mod statistics;
mod type_inference;

use polars::prelude::*;
use rand::prelude::*;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{ColumnProfile, ColumnType, DatasetProfile};
use crate::utils::{cell_to_string, count_missing};

pub(crate) use statistics::column_skewness;

/// Schema profiler for analyzing dataset structure.
pub struct SchemaProfiler;

impl SchemaProfiler {
    /// Profile an entire dataset: per-column types and statistics plus
    /// dataset-level duplicate counts.
    pub fn profile_dataset(df: &DataFrame, config: &PipelineConfig) -> Result<DatasetProfile> {
        let mut column_profiles = Vec::with_capacity(df.width());

        for col_name in df.get_column_names() {
            let profile = Self::profile_column(df, col_name, config)?;
            debug!(
                column = %profile.name,
                inferred_type = profile.inferred_type.display_name(),
                missing = profile.missing_count,
                "profiled column"
            );
            column_profiles.push(profile);
        }

        let duplicate_count = if df.height() > 0 {
            df.height()
                - df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
                    .height()
        } else {
            0
        };
        let duplicate_percentage = if df.height() > 0 {
            (duplicate_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        Ok(DatasetProfile {
            shape: (df.height(), df.width()),
            column_profiles,
            duplicate_count,
            duplicate_percentage,
        })
    }

    fn profile_column(
        df: &DataFrame,
        col_name: &str,
        config: &PipelineConfig,
    ) -> Result<ColumnProfile> {
        let col = df.column(col_name)?;
        let series = col.as_materialized_series();
        let dtype = format!("{:?}", series.dtype());

        let missing_count = count_missing(series);
        let missing_percentage = if df.height() > 0 {
            (missing_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };
        let distinct_count = series.n_unique()?;

        let sample_values = Self::sample_values(series);

        let inferred_type =
            type_inference::infer_column_type(series, col_name, config.type_inference_threshold)?;

        let numeric_stats = if inferred_type == ColumnType::Numeric {
            statistics::numeric_stats(series)?
        } else {
            None
        };

        Ok(ColumnProfile {
            name: col_name.to_string(),
            dtype,
            inferred_type,
            missing_count,
            missing_percentage,
            distinct_count,
            sample_values,
            numeric_stats,
        })
    }

    /// Up to 10 non-null sample values, deterministically seeded so repeated
    /// profiles of the same frame are identical.
    fn sample_values(series: &Series) -> Vec<String> {
        let non_null = series.drop_nulls();
        if non_null.is_empty() {
            return Vec::new();
        }

        let sample_size = std::cmp::min(10, non_null.len());
        let mut rng = StdRng::seed_from_u64(42);
        let indices: Vec<usize> = (0..non_null.len()).collect();
        let mut sampled: Vec<usize> = indices
            .choose_multiple(&mut rng, sample_size)
            .copied()
            .collect();
        sampled.sort_unstable();

        sampled
            .into_iter()
            .filter_map(|idx| cell_to_string(&non_null, idx))
            .collect()
    }
}
