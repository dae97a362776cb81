//! Aspect-preserving placement of the delayed view.

use crate::capture::Resolution;

/// Available output area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// A `width` x `height` area.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<Resolution> for Size {
    fn from(res: Resolution) -> Self {
        Self::new(res.width as f64, res.height as f64)
    }
}

/// Placement of the source image inside its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Native capture size.
    pub source: Size,
    /// Output area.
    pub container: Size,
    /// Source size after orientation correction.
    pub effective_source: Size,
    /// True when the source was swapped to match a landscape device.
    pub orientation_corrected: bool,
    /// Fitted output width.
    pub output_width: f64,
    /// Fitted output height.
    pub output_height: f64,
    /// Horizontal slack on the left of the output.
    pub offset_x: f64,
    /// Vertical slack above the output.
    pub offset_y: f64,
}

impl Geometry {
    /// Output size rounded to whole surface pixels, never zero.
    pub fn surface_size(&self) -> (u32, u32) {
        let w = self.output_width.round().max(1.0) as u32;
        let h = self.output_height.round().max(1.0) as u32;
        (w, h)
    }

    /// Offset rounded to whole pixels.
    pub fn surface_offset(&self) -> (i32, i32) {
        (self.offset_x.round() as i32, self.offset_y.round() as i32)
    }
}

/// Computes a "contain" fit of `source` inside `container`.
///
/// When the device is landscape but the content is portrait the source
/// dimensions are swapped before fitting. Returns `None` when any
/// dimension is zero or not finite, in which case nothing should be drawn.
pub fn compute_fit(source: Size, container: Size, device_is_landscape: bool) -> Option<Geometry> {
    if !source.is_drawable() || !container.is_drawable() {
        return None;
    }

    let orientation_corrected = device_is_landscape && source.height > source.width;
    let effective_source = if orientation_corrected {
        Size::new(source.height, source.width)
    } else {
        source
    };

    let source_ratio = effective_source.width / effective_source.height;
    let container_ratio = container.width / container.height;

    let (output_width, output_height, offset_x, offset_y) = if source_ratio > container_ratio {
        let w = container.width;
        let h = w / source_ratio;
        (w, h, 0.0, (container.height - h) / 2.0)
    } else {
        let h = container.height;
        let w = h * source_ratio;
        (w, h, (container.width - w) / 2.0, 0.0)
    };

    Some(Geometry {
        source,
        container,
        effective_source,
        orientation_corrected,
        output_width,
        output_height,
        offset_x,
        offset_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(sw: f64, sh: f64, cw: f64, ch: f64, landscape: bool) -> Option<Geometry> {
        compute_fit(Size::new(sw, sh), Size::new(cw, ch), landscape)
    }

    #[test]
    fn test_width_constrained() {
        let g = fit(1920.0, 1080.0, 1000.0, 1000.0, false).unwrap();
        assert_eq!(g.output_width, 1000.0);
        assert!((g.output_height - 562.5).abs() < 1e-9);
        assert_eq!(g.offset_x, 0.0);
        assert!((g.offset_y - 218.75).abs() < 1e-9);
    }

    #[test]
    fn test_height_constrained() {
        let g = fit(480.0, 640.0, 1280.0, 720.0, false).unwrap();
        assert_eq!(g.output_height, 720.0);
        assert_eq!(g.output_width, 540.0);
        assert_eq!(g.offset_x, 370.0);
        assert_eq!(g.offset_y, 0.0);
        assert!(!g.orientation_corrected);
    }

    #[test]
    fn test_landscape_device_swaps_portrait_source() {
        let g = fit(480.0, 640.0, 1280.0, 720.0, true).unwrap();
        assert!(g.orientation_corrected);
        assert_eq!(g.effective_source, Size::new(640.0, 480.0));
        assert_eq!(g.output_height, 720.0);
        assert_eq!(g.output_width, 960.0);
        assert_eq!(g.offset_x, 160.0);
    }

    #[test]
    fn test_landscape_source_not_swapped() {
        let g = fit(640.0, 480.0, 1280.0, 720.0, true).unwrap();
        assert!(!g.orientation_corrected);
    }

    #[test]
    fn test_degenerate_dimensions_indeterminate() {
        assert!(fit(0.0, 480.0, 1280.0, 720.0, false).is_none());
        assert!(fit(640.0, 480.0, 1280.0, 0.0, false).is_none());
        assert!(fit(640.0, f64::NAN, 1280.0, 720.0, false).is_none());
    }

    #[test]
    fn test_surface_size_rounds() {
        let g = fit(1920.0, 1080.0, 1000.0, 1000.0, false).unwrap();
        assert_eq!(g.surface_size(), (1000, 563));
        assert_eq!(g.surface_offset(), (0, 219));
    }
}
