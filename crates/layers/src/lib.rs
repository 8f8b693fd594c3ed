pub mod map;
pub mod surface;
pub mod symbology;

#[cfg(not(target_arch = "wasm32"))]
pub mod fonts;
#[cfg(not(target_arch = "wasm32"))]
pub mod raster;

pub use map::{FrameStats, MapRenderer, SideFrame};
pub use surface::{DrawSurface, Shadow, TextAlign, TextStyle};
pub use symbology::{LabelStyle, MapStyle, MarkerStyle};

#[cfg(not(target_arch = "wasm32"))]
pub use raster::RasterSurface;
