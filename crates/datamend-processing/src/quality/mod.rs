//! Quality assessment module.
//!
//! Produces the before and after [`crate::types::QualityReport`]s that frame
//! a pipeline run. Assessment never mutates the dataset.

mod assessor;

pub use assessor::QualityAssessor;
