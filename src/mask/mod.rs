//! In-painting mask authoring: raster, snapshot history, coordinate mapping
//! and the pointer-driven surface tying them together.

mod geometry;
mod history;
mod mapping;
mod raster;
mod stroke;
mod surface;

pub use history::MaskHistory;
pub use mapping::DisplayMapping;
pub use raster::{MaskError, MaskRaster, MaskSnapshot};
pub use stroke::{ActiveStroke, Brush};
pub use surface::{MaskMode, MaskSurface, MaskUpdate};
