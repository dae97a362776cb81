//! Output surfaces.

use super::{GridLines, Transform, GRID_OPACITY};
use crate::capture::Frame;
use thiserror::Error;

/// Errors raised by a renderer.
#[derive(Debug, Clone, Error)]
pub enum PresentError {
    /// The renderer could not take the draw.
    #[error("renderer refused the frame: {0}")]
    SinkRejected(String),
    /// Zero-sized surface, or a draw before the surface was sized.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurface {
        /// Surface width at the time.
        width: u32,
        /// Surface height at the time.
        height: u32,
    },
}

/// A surface the delayed view is drawn onto.
pub trait Renderer {
    /// Resizes the drawing surface. Called before drawing whenever the
    /// output size changes.
    fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), PresentError>;

    /// Moves the surface within its container.
    fn position_surface(&mut self, _x: i32, _y: i32) {}

    /// Draws `frame` scaled to the transform's destination size.
    fn draw_transformed(&mut self, frame: &Frame, transform: &Transform) -> Result<(), PresentError>;

    /// Draws the positioning grid over the current contents.
    fn draw_grid(&mut self, _grid: &GridLines) -> Result<(), PresentError> {
        Ok(())
    }
}

/// In-memory RGB framebuffer with nearest-neighbour scaling.
#[derive(Debug, Clone, Default)]
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    offset: (i32, i32),
    pixels: Vec<u8>,
    frames_drawn: u64,
    last_sequence: Option<u64>,
}

impl SoftwareSurface {
    /// An unsized surface; the first resize allocates it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Last position set within the container.
    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    /// Raw RGB contents, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of frames drawn since creation.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Sequence number of the last frame drawn.
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Reads one surface pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    fn blend_white(&mut self, x: u32, y: u32) {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        for c in &mut self.pixels[idx..idx + 3] {
            *c = (*c as f64 * (1.0 - GRID_OPACITY) + 255.0 * GRID_OPACITY).round() as u8;
        }
    }
}

impl Renderer for SoftwareSurface {
    fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), PresentError> {
        if width == 0 || height == 0 {
            return Err(PresentError::InvalidSurface { width, height });
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 3];
        tracing::debug!(width, height, "Surface resized");
        Ok(())
    }

    fn position_surface(&mut self, x: i32, y: i32) {
        self.offset = (x, y);
    }

    fn draw_transformed(&mut self, frame: &Frame, transform: &Transform) -> Result<(), PresentError> {
        if self.width == 0 || self.height == 0 {
            return Err(PresentError::InvalidSurface {
                width: self.width,
                height: self.height,
            });
        }

        let (sw, sh) = (self.width as u64, self.height as u64);
        let (dw, dh) = (
            transform.dest_width.max(1) as u64,
            transform.dest_height.max(1) as u64,
        );
        let (fw, fh) = (frame.width() as u64, frame.height() as u64);

        for y in 0..sh {
            for x in 0..sw {
                // Map the surface pixel back into destination space.
                let (u, v) = if transform.is_rotated() {
                    (y, sw - 1 - x)
                } else if transform.mirror {
                    (sw - 1 - x, y)
                } else {
                    (x, y)
                };
                let fx = (u * fw / dw) as u32;
                let fy = (v * fh / dh) as u32;
                let rgb = frame.rgb_at(fx, fy);

                let idx = ((y * sw + x) * 3) as usize;
                self.pixels[idx..idx + 3].copy_from_slice(&rgb);
            }
        }

        self.frames_drawn += 1;
        self.last_sequence = Some(frame.sequence());
        Ok(())
    }

    fn draw_grid(&mut self, grid: &GridLines) -> Result<(), PresentError> {
        let xs = grid.pixel_positions(self.width);
        let ys = grid.pixel_positions(self.height);
        let mut on_column = vec![false; self.width as usize];
        for &x in &xs {
            on_column[x as usize] = true;
            for y in 0..self.height {
                self.blend_white(x, y);
            }
        }
        for &y in &ys {
            for x in 0..self.width {
                // Intersections are blended once by the vertical pass
                if !on_column[x as usize] {
                    self.blend_white(x, y);
                }
            }
        }
        Ok(())
    }
}
