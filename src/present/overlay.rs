//! Positioning grid drawn over the delayed view.

/// Opacity of grid lines.
pub const GRID_OPACITY: f64 = 0.4;

/// Most lines per axis a grid can carry.
pub const MAX_GRID_LINES: u32 = 32;

/// Evenly spaced grid lines, the same count on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    count: u32,
}

impl GridLines {
    /// A grid of `count` lines per axis, capped at [`MAX_GRID_LINES`].
    pub fn new(count: u32) -> Self {
        Self {
            count: count.min(MAX_GRID_LINES),
        }
    }

    /// Lines per axis.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// True when no lines are drawn.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Line positions as a percentage of the output extent.
    pub fn percent_positions(&self) -> Vec<f64> {
        let step = 100.0 / (self.count as f64 + 1.0);
        (1..=self.count).map(|i| i as f64 * step).collect()
    }

    /// Distinct line positions in pixels along an axis of `extent` pixels.
    ///
    /// Lines that land on the same pixel row or column collapse into one.
    pub fn pixel_positions(&self, extent: u32) -> Vec<u32> {
        if extent == 0 {
            return Vec::new();
        }
        let mut positions: Vec<u32> = self
            .percent_positions()
            .into_iter()
            .map(|p| ((p / 100.0 * extent as f64).floor() as u32).min(extent - 1))
            .collect();
        positions.dedup();
        positions
    }
}
