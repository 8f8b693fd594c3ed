use catalog::{DatasetSummary, ScenarioYearIndex, content_id};
use formats::{FormatError, parse_records, parse_records_strict};
use streaming::{FetchError, Transport, fetch_text};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("malformed data: {0}")]
    Format(#[from] FormatError),
    #[error("dataset contains no usable rows")]
    EmptyDataset,
}

/// An indexed dataset ready to hand to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub index: ScenarioYearIndex,
    pub summary: DatasetSummary,
}

/// Parses and indexes already-fetched text.
pub fn build_dataset(text: &str, strict: bool) -> Result<LoadedDataset, LoadError> {
    let (records, skipped) = if strict {
        (parse_records_strict(text)?, 0)
    } else {
        let parsed = parse_records(text);
        let skipped = parsed.skipped.len();
        (parsed.records, skipped)
    };

    let index = ScenarioYearIndex::build(records);
    if index.is_empty() {
        return Err(LoadError::EmptyDataset);
    }

    let summary = index.summary(content_id(text), skipped);
    info!(
        records = summary.record_count,
        years = summary.years.len(),
        scenarios = summary.scenarios.len(),
        skipped = summary.skipped_rows,
        hash = %summary.content_hash,
        "dataset indexed"
    );
    Ok(LoadedDataset { index, summary })
}

/// Fetches `url`, then parses and indexes the body.
///
/// `on_progress` sees the fetch percentages; the caller delivers the result
/// to the controller together with the token it started the load under.
pub async fn load_dataset<T, F>(
    transport: &T,
    url: &str,
    strict: bool,
    on_progress: F,
) -> Result<LoadedDataset, LoadError>
where
    T: Transport,
    F: FnMut(u8),
{
    let result = match fetch_text(transport, url, on_progress).await {
        Ok(text) => build_dataset(&text, strict),
        Err(err) => Err(err.into()),
    };
    if let Err(err) = &result {
        error!(url, %err, "dataset load failed");
    }
    result
}
