//! Output geometry.
//!
//! Pure computations recomputed on resize, orientation, or resolution
//! changes. Nothing here is persisted.

mod fit;

pub use fit::{compute_fit, Geometry, Size};
