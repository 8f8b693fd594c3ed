use futures_util::StreamExt;
use tracing::debug;

use crate::error::FetchError;
use crate::transport::{FetchResponse, Transport};

/// HTTP(S) transport streaming the body with `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn open(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        let content_length = resp.content_length();
        debug!(url, %status, ?content_length, "response head");

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| FetchError::Transport(e.to_string())))
            .boxed_local();

        Ok(FetchResponse {
            status,
            content_length,
            body,
        })
    }
}
