//! Composites released frames onto a renderer.

use super::{GridLines, PresentError, Renderer, Transform};
use crate::buffer::TimedUnit;
use crate::capture::Frame;
use crate::geometry::Geometry;

/// Per-frame presentation flags, taken from the session config snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentOptions {
    /// Flip the view horizontally.
    pub mirror: bool,
    /// Grid lines per axis; zero disables the overlay.
    pub grid_lines: u32,
}

/// Presentation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentStats {
    /// Frames drawn onto the surface.
    pub presented: u64,
    /// Frames dropped because a newer frame was released in the same tick.
    pub superseded: u64,
    /// Draws the renderer refused.
    pub rejected: u64,
    /// Presented frames whose grid overlay could not be drawn.
    pub overlay_failures: u64,
}

/// Draws delayed frames with the current geometry and transform.
pub struct Presenter<R> {
    renderer: R,
    surface: Option<(u32, u32)>,
    offset: Option<(i32, i32)>,
    stats: PresentStats,
}

impl<R: Renderer> Presenter<R> {
    /// Wraps `renderer`; the surface is sized on the first draw.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            surface: None,
            offset: None,
            stats: PresentStats::default(),
        }
    }

    /// Sizes and positions the surface for `geometry`.
    ///
    /// The surface is only resized when the output size changed, so
    /// steady-state ticks do not reallocate it.
    pub fn prepare(&mut self, geometry: &Geometry) -> Result<(), PresentError> {
        let size = geometry.surface_size();
        if self.surface != Some(size) {
            self.renderer.resize_surface(size.0, size.1)?;
            self.surface = Some(size);
        }
        let offset = geometry.surface_offset();
        if self.offset != Some(offset) {
            self.renderer.position_surface(offset.0, offset.1);
            self.offset = Some(offset);
        }
        Ok(())
    }

    /// Draws one released unit.
    ///
    /// On error the frame was not drawn; the caller still owns the unit
    /// and may queue it again. A failed grid overlay is not an error.
    pub fn present(
        &mut self,
        unit: &TimedUnit<Frame>,
        geometry: &Geometry,
        options: &PresentOptions,
    ) -> Result<(), PresentError> {
        self.prepare(geometry)?;

        let transform = Transform::plan(geometry, options.mirror);
        if let Err(e) = self.renderer.draw_transformed(unit.payload(), &transform) {
            self.stats.rejected += 1;
            return Err(e);
        }
        // The frame is on screen; a missing overlay must not send it back
        if options.grid_lines > 0 {
            if let Err(e) = self.renderer.draw_grid(&GridLines::new(options.grid_lines)) {
                self.stats.overlay_failures += 1;
                tracing::debug!(error = %e, "Grid overlay skipped");
            }
        }

        self.stats.presented += 1;
        tracing::trace!(
            sequence = unit.payload().sequence(),
            captured_ms = unit.captured_at().as_millis() as u64,
            rotation = transform.rotation_deg,
            mirror = transform.mirror,
            "Presented frame"
        );
        Ok(())
    }

    /// Records frames dropped in favour of a newer one.
    pub fn note_superseded(&mut self, count: usize) {
        self.stats.superseded += count as u64;
    }

    /// Forgets the current surface size so the next draw resizes it.
    pub fn invalidate(&mut self) {
        self.surface = None;
        self.offset = None;
    }

    /// Presentation counters since creation.
    pub fn stats(&self) -> PresentStats {
        self.stats
    }

    /// The wrapped renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The wrapped renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{compute_fit, Size};
    use crate::present::SoftwareSurface;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingRenderer {
        resizes: Vec<(u32, u32)>,
        positions: Vec<(i32, i32)>,
        draws: Vec<Transform>,
        grids: u32,
    }

    impl Renderer for CountingRenderer {
        fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), PresentError> {
            self.resizes.push((width, height));
            Ok(())
        }

        fn position_surface(&mut self, x: i32, y: i32) {
            self.positions.push((x, y));
        }

        fn draw_transformed(&mut self, _frame: &Frame, transform: &Transform) -> Result<(), PresentError> {
            self.draws.push(*transform);
            Ok(())
        }

        fn draw_grid(&mut self, _grid: &GridLines) -> Result<(), PresentError> {
            self.grids += 1;
            Ok(())
        }
    }

    fn unit(width: u32, height: u32) -> TimedUnit<Frame> {
        let frame = Frame::gray(vec![0; (width * height) as usize], width, height, 1);
        TimedUnit::new(frame, Duration::ZERO)
    }

    #[test]
    fn test_resizes_only_on_change() {
        let mut presenter = Presenter::new(CountingRenderer::default());
        let g1 = compute_fit(Size::new(640.0, 480.0), Size::new(800.0, 600.0), false).unwrap();
        let g2 = compute_fit(Size::new(640.0, 480.0), Size::new(400.0, 600.0), false).unwrap();
        let options = PresentOptions::default();

        presenter.present(&unit(640, 480), &g1, &options).unwrap();
        presenter.present(&unit(640, 480), &g1, &options).unwrap();
        presenter.present(&unit(640, 480), &g2, &options).unwrap();

        let renderer = presenter.renderer();
        assert_eq!(renderer.resizes, vec![(800, 600), (400, 300)]);
        assert_eq!(renderer.positions, vec![(0, 0), (0, 150)]);
        assert_eq!(presenter.stats().presented, 3);
    }

    #[test]
    fn test_grid_only_when_enabled() {
        let mut presenter = Presenter::new(CountingRenderer::default());
        let g = compute_fit(Size::new(4.0, 4.0), Size::new(4.0, 4.0), false).unwrap();

        presenter.present(&unit(4, 4), &g, &PresentOptions { mirror: false, grid_lines: 0 }).unwrap();
        presenter.present(&unit(4, 4), &g, &PresentOptions { mirror: true, grid_lines: 2 }).unwrap();

        let renderer = presenter.renderer();
        assert_eq!(renderer.grids, 1);
        assert!(!renderer.draws[0].mirror);
        assert!(renderer.draws[1].mirror);
    }

    #[test]
    fn test_grid_failure_keeps_frame_presented() {
        struct NoGrid(SoftwareSurface);

        impl Renderer for NoGrid {
            fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), PresentError> {
                self.0.resize_surface(width, height)
            }

            fn draw_transformed(&mut self, frame: &Frame, transform: &Transform) -> Result<(), PresentError> {
                self.0.draw_transformed(frame, transform)
            }

            fn draw_grid(&mut self, _grid: &GridLines) -> Result<(), PresentError> {
                Err(PresentError::SinkRejected("overlay unavailable".into()))
            }
        }

        let mut presenter = Presenter::new(NoGrid(SoftwareSurface::new()));
        let g = compute_fit(Size::new(4.0, 4.0), Size::new(4.0, 4.0), false).unwrap();
        let options = PresentOptions { mirror: false, grid_lines: 3 };

        assert!(presenter.present(&unit(4, 4), &g, &options).is_ok());
        let stats = presenter.stats();
        assert_eq!(stats.presented, 1);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.overlay_failures, 1);
        assert_eq!(presenter.renderer().0.frames_drawn(), 1);
    }

    #[test]
    fn test_invalidate_forces_resize() {
        let mut presenter = Presenter::new(SoftwareSurface::new());
        let g = compute_fit(Size::new(4.0, 2.0), Size::new(4.0, 2.0), false).unwrap();
        presenter.present(&unit(4, 2), &g, &PresentOptions::default()).unwrap();
        presenter.invalidate();
        presenter.present(&unit(4, 2), &g, &PresentOptions::default()).unwrap();
        assert_eq!(presenter.renderer().frames_drawn(), 2);
        assert_eq!(presenter.renderer().width(), 4);
    }
}
