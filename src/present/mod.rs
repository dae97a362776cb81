//! Presentation of delayed frames.
//!
//! Released frames are scaled to the fitted output size, rotated when the
//! device and content orientations disagree, optionally mirrored, and
//! overlaid with a positioning grid.

mod overlay;
mod pipeline;
mod renderer;
mod transform;

pub use overlay::{GridLines, GRID_OPACITY, MAX_GRID_LINES};
pub use pipeline::{PresentOptions, PresentStats, Presenter};
pub use renderer::{PresentError, Renderer, SoftwareSurface};
pub use transform::Transform;
