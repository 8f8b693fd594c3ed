//! Scenario/year indexing over parsed precipitation records.

pub mod dataset;
pub mod index;

pub use dataset::{DatasetSummary, content_id};
pub use index::ScenarioYearIndex;
