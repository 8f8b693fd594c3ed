use std::path::Path;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use http::StatusCode;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::FetchError;
use crate::transport::{FetchResponse, Transport};

const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;

/// Streams a local file in fixed-size chunks.
///
/// The URL is a filesystem path, optionally prefixed with `file://`. A
/// missing file is reported like an HTTP 404 so callers see one failure shape
/// for both transports.
#[derive(Debug, Clone)]
pub struct FileTransport {
    chunk_bytes: usize,
}

impl Default for FileTransport {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }
}

impl FileTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_bytes(chunk_bytes: usize) -> Self {
        Self {
            chunk_bytes: chunk_bytes.max(1),
        }
    }
}

impl Transport for FileTransport {
    async fn open(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        let file = match File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FetchResponse {
                    status: StatusCode::NOT_FOUND,
                    content_length: None,
                    body: stream::empty::<Result<Bytes, FetchError>>().boxed_local(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let content_length = file.metadata().await?.len();

        let buf = vec![0u8; self.chunk_bytes];
        let body = stream::try_unfold((file, buf), |(file, buf)| read_chunk(file, buf)).boxed_local();

        Ok(FetchResponse {
            status: StatusCode::OK,
            content_length: Some(content_length),
            body,
        })
    }
}

async fn read_chunk(
    mut file: File,
    mut buf: Vec<u8>,
) -> Result<Option<(Bytes, (File, Vec<u8>))>, FetchError> {
    let n = file.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    let chunk = Bytes::copy_from_slice(&buf[..n]);
    Ok(Some((chunk, (file, buf))))
}
