//! Pipeline orchestration.
//!
//! Wires the profiler, assessor, resolvers, and standardizer into a single
//! `process()` call with a fixed stage order. Stages communicate only through
//! the returned frame and the accumulating correction log.

mod builder;
pub(crate) mod outliers;
mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::OutlierHandler;
pub use progress::{CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
