use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::{self, LocalBoxStream};
use http::StatusCode;

use crate::error::FetchError;

/// Body chunks as they arrive.
pub type ByteStream = LocalBoxStream<'static, Result<Bytes, FetchError>>;

/// Response head plus a streaming body.
pub struct FetchResponse {
    pub status: StatusCode,
    /// Declared body length, when the transport knows it.
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Opens a resource for streaming.
///
/// Futures and streams are not required to be `Send`: loading runs on a
/// single cooperative thread (the browser event loop or a current-thread
/// runtime).
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn open(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Serves one pre-chunked body for any URL.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    status: StatusCode,
    content_length: Option<u64>,
    chunks: Vec<Bytes>,
    fail_after: Option<usize>,
}

impl MemoryTransport {
    /// Successful response whose declared length matches the chunks.
    pub fn new(chunks: Vec<Bytes>) -> Self {
        let len = chunks.iter().map(|c| c.len() as u64).sum();
        Self {
            status: StatusCode::OK,
            content_length: Some(len),
            chunks,
            fail_after: None,
        }
    }

    /// Splits `text` into chunks of `chunk_size` bytes (byte boundaries, so
    /// multi-byte characters may be split).
    pub fn from_text(text: &str, chunk_size: usize) -> Self {
        let chunks = text
            .as_bytes()
            .chunks(chunk_size.max(1))
            .map(Bytes::copy_from_slice)
            .collect();
        Self::new(chunks)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_length(mut self, content_length: Option<u64>) -> Self {
        self.content_length = content_length;
        self
    }

    /// The body errors after yielding `chunks` chunks.
    pub fn failing_after(mut self, chunks: usize) -> Self {
        self.fail_after = Some(chunks);
        self
    }
}

impl Transport for MemoryTransport {
    async fn open(&self, _url: &str) -> Result<FetchResponse, FetchError> {
        let take = self.fail_after.unwrap_or(self.chunks.len());
        let mut items: Vec<Result<Bytes, FetchError>> =
            self.chunks.iter().take(take).cloned().map(Ok).collect();
        if self.fail_after.is_some() {
            items.push(Err(FetchError::Transport("connection reset".to_string())));
        }
        Ok(FetchResponse {
            status: self.status,
            content_length: self.content_length,
            body: stream::iter(items).boxed_local(),
        })
    }
}
