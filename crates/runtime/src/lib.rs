pub mod config;
pub mod controller;
pub mod load;
pub mod selection;

pub use config::*;
pub use controller::*;
pub use load::*;
pub use selection::*;
