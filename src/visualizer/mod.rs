//! Spectrum bar rendering
//!
//! Draws analyser bins onto an abstract [`Surface`]: one bar per bin while
//! playing, a flat baseline otherwise.

mod terminal;

pub use terminal::TerminalSurface;

/// Default drawing surface width
pub const SURFACE_WIDTH: f32 = 600.0;

/// Default drawing surface height
pub const SURFACE_HEIGHT: f32 = 100.0;

/// Gap between bars
pub const BAR_GUTTER: f32 = 1.0;

/// Height of the idle baseline
pub const BASELINE_HEIGHT: f32 = 2.0;

/// Bar gradient color at the bottom edge
pub const BAR_BOTTOM: Rgb = Rgb::from_hex(0x003b_82f6);

/// Bar gradient color at the top edge
pub const BAR_TOP: Rgb = Rgb::from_hex(0x0060_a5fa);

/// Idle baseline color
pub const BASELINE_COLOR: Rgb = Rgb::from_hex(0x0033_4155);

/// 24-bit color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build from `0xRRGGBB`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// How a rectangle is painted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    Solid(Rgb),
    /// Two-stop gradient from the rectangle's bottom edge to its top edge
    VerticalGradient { bottom: Rgb, top: Rgb },
}

/// Axis-aligned rectangle with the origin at the top-left corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A 2D drawing target
pub trait Surface {
    fn width(&self) -> f32;

    fn height(&self) -> f32;

    /// Erase everything
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, fill: Fill);

    /// Flush a finished frame
    fn present(&mut self) {}
}

/// Bar rectangles for a set of bins on a `width` × `height` surface
///
/// Bars are `width / bins × 2.5` wide, half as tall as the bin value, and laid
/// out left to right with a 1-unit gutter. Bars past the right edge are kept.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bar_layout(bins: &[u8], width: f32, height: f32) -> Vec<Rect> {
    if bins.is_empty() {
        return Vec::new();
    }

    let bar_width = (width / bins.len() as f32) * 2.5;
    let mut x = 0.0;

    bins.iter()
        .map(|&value| {
            let bar_height = f32::from(value) / 2.0;
            let rect = Rect {
                x,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
            };
            x += bar_width + BAR_GUTTER;
            rect
        })
        .collect()
}

/// Clear the surface and draw one gradient bar per bin
pub fn draw_bars<S: Surface + ?Sized>(surface: &mut S, bins: &[u8]) {
    surface.clear();
    for rect in bar_layout(bins, surface.width(), surface.height()) {
        surface.fill_rect(
            rect,
            Fill::VerticalGradient {
                bottom: BAR_BOTTOM,
                top: BAR_TOP,
            },
        );
    }
}

/// Clear the surface and draw the flat idle baseline
pub fn draw_baseline<S: Surface + ?Sized>(surface: &mut S) {
    surface.clear();
    let rect = Rect {
        x: 0.0,
        y: surface.height() - BASELINE_HEIGHT,
        width: surface.width(),
        height: BASELINE_HEIGHT,
    };
    surface.fill_rect(rect, Fill::Solid(BASELINE_COLOR));
}

/// One recorded drawing command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Fill(Rect, Fill),
}

/// Surface that records drawing commands instead of rasterizing them
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
    frames: usize,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(SURFACE_WIDTH, SURFACE_HEIGHT)
    }
}

impl RecordingSurface {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            frames: 0,
        }
    }

    /// Commands since the last clear
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of presented frames
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Whether the current frame is exactly the idle baseline
    #[must_use]
    pub fn shows_baseline(&self) -> bool {
        matches!(
            self.ops.as_slice(),
            [DrawOp::Clear, DrawOp::Fill(rect, Fill::Solid(color))]
                if *color == BASELINE_COLOR && (rect.height - BASELINE_HEIGHT).abs() < f32::EPSILON
        )
    }

    /// Number of bars in the current frame
    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill(_, Fill::VerticalGradient { .. })))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, fill: Fill) {
        self.ops.push(DrawOp::Fill(rect, fill));
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}
