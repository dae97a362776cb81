//! Draw transform selection.

use crate::geometry::Geometry;

/// How a frame is placed onto the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Clockwise rotation about the output center, 0 or 90.
    pub rotation_deg: u16,
    /// Horizontal reflection about the output's vertical axis.
    pub mirror: bool,
    /// Width the frame is scaled to before rotation.
    pub dest_width: u32,
    /// Height the frame is scaled to before rotation.
    pub dest_height: u32,
}

impl Transform {
    /// Picks the transform for `geometry`.
    ///
    /// An orientation correction rotates by 90 degrees and swaps the draw
    /// size. Mirroring is only applied when no rotation is active.
    pub fn plan(geometry: &Geometry, mirror_enabled: bool) -> Self {
        let (w, h) = geometry.surface_size();
        if geometry.orientation_corrected {
            Self {
                rotation_deg: 90,
                mirror: false,
                dest_width: h,
                dest_height: w,
            }
        } else {
            Self {
                rotation_deg: 0,
                mirror: mirror_enabled,
                dest_width: w,
                dest_height: h,
            }
        }
    }

    /// True when the frame is drawn rotated a quarter turn.
    #[inline]
    pub fn is_rotated(&self) -> bool {
        self.rotation_deg == 90
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{compute_fit, Size};

    #[test]
    fn test_plain_mirror() {
        let g = compute_fit(Size::new(640.0, 480.0), Size::new(640.0, 480.0), false).unwrap();
        let t = Transform::plan(&g, true);
        assert_eq!(t.rotation_deg, 0);
        assert!(t.mirror);
        assert_eq!((t.dest_width, t.dest_height), (640, 480));
    }

    #[test]
    fn test_rotation_suppresses_mirror() {
        let g = compute_fit(Size::new(480.0, 640.0), Size::new(1280.0, 720.0), true).unwrap();
        let t = Transform::plan(&g, true);
        assert!(t.is_rotated());
        assert!(!t.mirror);
        assert_eq!((t.dest_width, t.dest_height), (720, 960));
    }
}
