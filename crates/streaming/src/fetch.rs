use futures_util::StreamExt;
use tracing::{debug, info};

use crate::decode::Utf8StreamDecoder;
use crate::error::FetchError;
use crate::progress::ProgressTracker;
use crate::transport::Transport;

/// Upper bound for pre-allocating the text buffer from a declared length.
const MAX_PREALLOC_BYTES: u64 = 64 * 1024 * 1024;

/// Fetches `url` through `transport` and returns the whole body as text.
///
/// `on_progress` receives non-decreasing percentages and always ends with
/// 100 on success. Failures (non-success status, transport or stream error)
/// return no text.
pub async fn fetch_text<T, F>(transport: &T, url: &str, mut on_progress: F) -> Result<String, FetchError>
where
    T: Transport,
    F: FnMut(u8),
{
    let response = transport.open(url).await?;
    if !response.status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    let mut tracker = ProgressTracker::new(response.content_length);
    if tracker.is_indeterminate() {
        debug!(url, "content length unknown; progress is indeterminate");
    }

    let capacity = response.content_length.unwrap_or(0).min(MAX_PREALLOC_BYTES) as usize;
    let mut text = String::with_capacity(capacity);
    let mut decoder = Utf8StreamDecoder::new();
    let mut body = response.body;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        decoder.push(&chunk, &mut text);
        if let Some(pct) = tracker.advance(chunk.len() as u64) {
            on_progress(pct);
        }
    }

    decoder.finish(&mut text);
    if let Some(pct) = tracker.finish() {
        on_progress(pct);
    }

    info!(url, bytes = tracker.received(), "fetch complete");
    Ok(text)
}
