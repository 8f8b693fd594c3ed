pub mod decode;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod request;
pub mod transport;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(not(target_arch = "wasm32"))]
pub mod remote;

pub use decode::*;
pub use error::*;
pub use fetch::*;
pub use progress::*;
pub use request::*;
pub use transport::*;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use remote::HttpTransport;
