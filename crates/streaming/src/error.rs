use http::StatusCode;
use thiserror::Error;

/// Terminal failure of one fetch. No partial body accompanies it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} responded with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
