//! Glyph geometry: bounds, raster grid and per-column profiles.
//!
//! All geometry is expressed in the canonical 200 × 200 coordinate
//! space regardless of the resolution a glyph was profiled at, so
//! glyphs rasterized at different resolutions (e.g. preloaded at a
//! reduced resolution) stay interchangeable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Variant;

/// Side length of the canonical coordinate space.
pub const CANONICAL_SIZE: f32 = 200.0;

/// Minimum column density considered "inked" by collision tests.
pub const INK_DENSITY: f32 = 0.1;

// ── Bounds ──────────────────────────────────────────────────────────

/// Ink bounding box of a glyph in canonical units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl GlyphBounds {
    /// Create bounds, reordering each axis so `left ≤ right` and
    /// `top ≤ bottom` always hold.
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    /// The whole canonical canvas.
    pub fn full_canvas() -> Self {
        Self::new(0.0, CANONICAL_SIZE, 0.0, CANONICAL_SIZE)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Scale every edge by `factor` (factor must be positive).
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            self.left * factor,
            self.right * factor,
            self.top * factor,
            self.bottom * factor,
        )
    }
}

// ── Column profile ──────────────────────────────────────────────────

/// Vertical extent and ink density of one raster column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnProfile {
    /// Topmost inked row (canonical units).
    pub top: f32,
    /// Bottommost inked row (canonical units).
    pub bottom: f32,
    /// Inked cells / cells spanned between `top` and `bottom`.
    pub density: f32,
}

impl ColumnProfile {
    /// Record for a column with no ink: full height, zero density.
    pub fn empty() -> Self {
        Self {
            top: 0.0,
            bottom: CANONICAL_SIZE,
            density: 0.0,
        }
    }

    #[inline]
    pub fn is_inked(&self) -> bool {
        self.density > INK_DENSITY
    }

    /// Whether the vertical ranges of two columns intersect.
    #[inline]
    pub fn overlaps_vertically(&self, other: &ColumnProfile) -> bool {
        self.top <= other.bottom && other.top <= self.bottom
    }
}

// ── Raster grid ─────────────────────────────────────────────────────

/// Boolean coverage grid sampled from a rendered glyph.
///
/// One cell per `stride × stride` block of the working raster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterGrid {
    pub cols: usize,
    pub rows: usize,
    pub stride: u32,
    cells: Vec<bool>,
}

impl RasterGrid {
    /// Create an all-off grid.
    pub fn new(cols: usize, rows: usize, stride: u32) -> Self {
        Self {
            cols,
            rows,
            stride,
            cells: vec![false; cols * rows],
        }
    }

    /// Grid with no cells (used by space glyphs).
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, on: bool) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = on;
        }
    }

    /// Number of "on" cells.
    pub fn coverage(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ── Glyph ───────────────────────────────────────────────────────────

/// A processed character asset with geometric and raster metadata.
#[derive(Clone, Debug)]
pub struct Glyph {
    /// The character as it appeared in the text.
    pub character: char,
    /// Variant the asset was selected as.
    pub variant: Variant,
    /// Source vector markup (empty for spaces).
    pub markup: Arc<str>,
    /// Canvas width in canonical units.
    pub width: f32,
    /// Canvas height in canonical units.
    pub height: f32,
    /// Ink bounds in canonical units.
    pub bounds: GlyphBounds,
    /// Coverage grid at the working resolution.
    pub raster: RasterGrid,
    /// Per-column profile, one entry per raster column.
    pub columns: Vec<ColumnProfile>,
    /// Width of one profile column in canonical units.
    pub column_width: f32,
    /// Working resolution the glyph was profiled at (0 if never rasterized).
    pub resolution: u32,
    /// Intrinsic render scale.
    pub scale: f32,
}

impl Glyph {
    /// Degenerate glyph for whitespace: fixed width, no ink.
    pub fn space(character: char, width: f32) -> Self {
        let width = width.max(0.0);
        Self {
            character,
            variant: Variant::Standard,
            markup: Arc::from(""),
            width,
            height: CANONICAL_SIZE,
            bounds: GlyphBounds::new(0.0, width, 0.0, 0.0),
            raster: RasterGrid::empty(),
            columns: Vec::new(),
            column_width: 1.0,
            resolution: 0,
            scale: 1.0,
        }
    }

    /// Deterministic stand-in for a character that could not be
    /// resolved or rasterized: a solid box inset by 20 units.
    pub fn placeholder(character: char) -> Self {
        const INSET: f32 = 20.0;
        const COLUMNS: usize = 100;

        let column_width = CANONICAL_SIZE / COLUMNS as f32;
        let columns = (0..COLUMNS)
            .map(|i| {
                let x = i as f32 * column_width;
                if x >= INSET && x <= CANONICAL_SIZE - INSET {
                    ColumnProfile {
                        top: INSET,
                        bottom: CANONICAL_SIZE - INSET,
                        density: 1.0,
                    }
                } else {
                    ColumnProfile::empty()
                }
            })
            .collect();

        let markup = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200"><rect x="{INSET}" y="{INSET}" width="{w}" height="{w}" fill="#9e9e9e"/></svg>"##,
            w = CANONICAL_SIZE - 2.0 * INSET,
        );

        Self {
            character,
            variant: Variant::Standard,
            markup: Arc::from(markup),
            width: CANONICAL_SIZE,
            height: CANONICAL_SIZE,
            bounds: GlyphBounds::new(INSET, CANONICAL_SIZE - INSET, INSET, CANONICAL_SIZE - INSET),
            raster: RasterGrid::empty(),
            columns,
            column_width,
            resolution: 0,
            scale: 1.0,
        }
    }

    /// Whether this glyph stands for whitespace.
    #[inline]
    pub fn is_space(&self) -> bool {
        self.character.is_whitespace()
    }

    /// Whether this is a [`placeholder`](Self::placeholder): the only
    /// non-whitespace glyph that was never rasterized.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.resolution == 0 && !self.is_space()
    }

    /// Whether the glyph carries no ink at all.
    pub fn is_blank(&self) -> bool {
        self.columns.iter().all(|c| c.density == 0.0)
    }

    /// Column profile covering canonical x-coordinate `x`.
    pub fn column_at(&self, x: f32) -> Option<&ColumnProfile> {
        if x < 0.0 || self.column_width <= 0.0 {
            return None;
        }
        self.columns.get((x / self.column_width) as usize)
    }

    /// Builder-style override of the intrinsic scale. Non-positive
    /// values are ignored.
    pub fn with_scale(mut self, scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
        self
    }
}

// ===================================================================
// Tests
// ===================================================================
