//! One-line terminal spectrum meter

use std::io::Write;

use super::{BASELINE_HEIGHT, Fill, Rect, SURFACE_HEIGHT, SURFACE_WIDTH, Surface};

const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Rasterizes bars into block characters, one column per cell
#[derive(Debug)]
pub struct TerminalSurface {
    columns: usize,
    levels: Vec<f32>,
    baseline: bool,
    enabled: bool,
}

impl TerminalSurface {
    /// Create a meter `columns` cells wide; a disabled meter never prints
    #[must_use]
    pub fn new(columns: usize, enabled: bool) -> Self {
        let columns = columns.max(1);
        Self {
            columns,
            levels: vec![0.0; columns],
            baseline: false,
            enabled,
        }
    }

    /// Render the current frame as a string
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_line(&self) -> String {
        if self.baseline && self.levels.iter().all(|&l| l <= 0.0) {
            return "─".repeat(self.columns);
        }

        self.levels
            .iter()
            .map(|&level| {
                let idx = (level.clamp(0.0, 1.0) * 8.0).round() as usize;
                LEVELS[idx.min(8)]
            })
            .collect()
    }

    /// Cells spanned by `rect`, clipped to the meter
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn columns_for(&self, rect: Rect) -> std::ops::Range<usize> {
        let cell = SURFACE_WIDTH / self.columns as f32;
        let start = (rect.x.max(0.0) / cell).floor() as usize;
        let end = ((rect.x + rect.width).max(0.0) / cell).ceil() as usize;
        start.min(self.columns)..end.min(self.columns)
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> f32 {
        SURFACE_WIDTH
    }

    fn height(&self) -> f32 {
        SURFACE_HEIGHT
    }

    fn clear(&mut self) {
        self.levels.fill(0.0);
        self.baseline = false;
    }

    fn fill_rect(&mut self, rect: Rect, fill: Fill) {
        if matches!(fill, Fill::Solid(_)) && rect.height <= BASELINE_HEIGHT {
            self.baseline = true;
            return;
        }

        let level = rect.height / SURFACE_HEIGHT;
        for column in self.columns_for(rect) {
            self.levels[column] = self.levels[column].max(level);
        }
    }

    fn present(&mut self) {
        if !self.enabled {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        // Best effort; a closed terminal is not a playback failure
        let _ = write!(stderr, "\r{}", self.render_line());
        let _ = stderr.flush();
    }
}
