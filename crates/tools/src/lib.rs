pub mod export;
pub mod source;

pub use export::{ExportError, render_split, write_png};
pub use source::SourceTransport;
