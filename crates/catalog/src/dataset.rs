use serde::{Deserialize, Serialize};

use crate::index::ScenarioYearIndex;

/// What the UI needs to know about a freshly loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub years: Vec<i32>,
    pub scenarios: Vec<String>,
    pub record_count: usize,
    pub skipped_rows: usize,
    /// blake3 of the source text; identifies the dataset in logs.
    pub content_hash: String,
}

/// Stable identifier for a source document.
pub fn content_id(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

impl ScenarioYearIndex {
    pub fn summary(&self, content_hash: impl Into<String>, skipped_rows: usize) -> DatasetSummary {
        DatasetSummary {
            years: self.years().to_vec(),
            scenarios: self.scenario_names(),
            record_count: self.len(),
            skipped_rows,
            content_hash: content_hash.into(),
        }
    }
}
