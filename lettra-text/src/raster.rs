//! Raster profiler. Rasterizes glyph markup and measures its footprint.
//!
//! Markup is parsed with `usvg`, rendered onto a square `tiny-skia`
//! pixmap by `resvg`, then sampled on a grid. The profiler reports:
//!
//! - the ink bounding box,
//! - a coverage grid,
//! - per column: topmost/bottommost inked row and ink density.
//!
//! Everything is rescaled into the canonical 200-unit space so that a
//! glyph profiled at 100px (preloading) and one profiled at 200px can be
//! laid out side by side.
//!
//! ```text
//! markup ──usvg──► Tree ──resvg──► Pixmap (res × res)
//!                                     │ sample every `stride` px
//!                                     ▼
//!                       RasterProfile { bounds, grid, columns }
//! ```

use lettra_core::{ColumnProfile, Glyph, GlyphBounds, RasterGrid, CANONICAL_SIZE};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use serde::{Deserialize, Serialize};

use crate::assets::ResolvedAsset;

/// Default working resolution.
pub const DEFAULT_RESOLUTION: u32 = 200;

/// Reduced resolution used for background preloading.
pub const PRELOAD_RESOLUTION: u32 = 100;

/// Alpha values strictly above this count as ink.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 10;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Unparseable glyph markup: {0}")]
    Parse(String),

    #[error("Cannot allocate a {0}px raster surface")]
    Surface(u32),
}

// ── Configuration ───────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Working resolution (pixels per side).
    pub resolution: u32,
    /// Sampling stride. `None` picks 2 above 100px, 1 otherwise.
    pub stride: Option<u32>,
    /// Alpha threshold (0–255) above which a pixel is inked.
    pub alpha_threshold: u8,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            stride: None,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl ProfilerConfig {
    /// Sampling stride to use at `resolution`.
    pub fn stride_for(&self, resolution: u32) -> u32 {
        self.stride
            .unwrap_or(if resolution > 100 { 2 } else { 1 })
            .max(1)
    }
}

// ── Profile ─────────────────────────────────────────────────────────

/// Footprint of one rasterized glyph, in canonical units.
#[derive(Clone, Debug)]
pub struct RasterProfile {
    pub bounds: GlyphBounds,
    pub raster: RasterGrid,
    pub columns: Vec<ColumnProfile>,
    pub column_width: f32,
    pub resolution: u32,
}

impl RasterProfile {
    /// Whether any cell was inked.
    pub fn has_ink(&self) -> bool {
        self.columns.iter().any(|c| c.density > 0.0)
    }
}

/// Running per-column statistics while scanning.
#[derive(Clone, Copy, Default)]
struct ColumnScan {
    top: Option<usize>,
    bottom: usize,
    count: usize,
}

// ── Profiler ────────────────────────────────────────────────────────

/// Stateless rasterizer + analyzer.
#[derive(Clone, Debug, Default)]
pub struct RasterProfiler {
    config: ProfilerConfig,
}

impl RasterProfiler {
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profile markup at the configured resolution.
    pub fn profile(&self, markup: &str) -> Result<RasterProfile, RasterError> {
        self.profile_at(markup, self.config.resolution)
    }

    /// Profile markup at an explicit resolution.
    pub fn profile_at(&self, markup: &str, resolution: u32) -> Result<RasterProfile, RasterError> {
        let alpha = self.rasterize(markup, resolution)?;
        Ok(self.profile_alpha(&alpha, resolution))
    }

    /// Profile a resolved asset into a full [`Glyph`].
    pub fn glyph(&self, asset: &ResolvedAsset, resolution: u32) -> Result<Glyph, RasterError> {
        let profile = self.profile_at(&asset.markup, resolution)?;
        Ok(Glyph {
            character: asset.character,
            variant: asset.variant,
            markup: asset.markup.clone(),
            width: CANONICAL_SIZE,
            height: CANONICAL_SIZE,
            bounds: profile.bounds,
            raster: profile.raster,
            columns: profile.columns,
            column_width: profile.column_width,
            resolution: profile.resolution,
            scale: 1.0,
        })
    }

    /// Render markup to a `resolution²` alpha plane.
    pub fn rasterize(&self, markup: &str, resolution: u32) -> Result<Vec<u8>, RasterError> {
        if resolution == 0 {
            return Err(RasterError::Surface(resolution));
        }

        let options = usvg::Options::default();
        let tree = usvg::Tree::from_str(markup, &options)
            .map_err(|e| RasterError::Parse(e.to_string()))?;

        let size = tree.size();
        if size.width() <= 0.0 || size.height() <= 0.0 {
            return Err(RasterError::Parse(format!(
                "degenerate viewport {}x{}",
                size.width(),
                size.height()
            )));
        }

        let mut pixmap =
            Pixmap::new(resolution, resolution).ok_or(RasterError::Surface(resolution))?;
        let transform = Transform::from_scale(
            resolution as f32 / size.width(),
            resolution as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(pixmap.data().chunks_exact(4).map(|px| px[3]).collect())
    }

    /// Analyze a row-major `resolution²` alpha plane.
    ///
    /// Missing samples (short slices) read as transparent.
    pub fn profile_alpha(&self, alpha: &[u8], resolution: u32) -> RasterProfile {
        let res = resolution.max(1) as usize;
        let stride = self.config.stride_for(resolution) as usize;
        let threshold = self.config.alpha_threshold;

        let cols = res.div_ceil(stride);
        let rows = cols;
        let mut grid = RasterGrid::new(cols, rows, stride as u32);
        let mut scans = vec![ColumnScan::default(); cols];

        // Global ink box in working pixels.
        let mut min_x = usize::MAX;
        let mut max_x = 0usize;
        let mut min_y = usize::MAX;
        let mut max_y = 0usize;

        for cy in 0..rows {
            let py = cy * stride;
            for (cx, scan) in scans.iter_mut().enumerate() {
                let px = cx * stride;
                let a = alpha.get(py * res + px).copied().unwrap_or(0);
                if a <= threshold {
                    continue;
                }

                grid.set(cx, cy, true);
                min_x = min_x.min(px);
                max_x = max_x.max(px);
                min_y = min_y.min(py);
                max_y = max_y.max(py);

                if scan.top.is_none() {
                    scan.top = Some(cy);
                }
                scan.bottom = cy;
                scan.count += 1;
            }
        }

        let factor = CANONICAL_SIZE / res as f32;
        let cell = stride as f32 * factor;

        let bounds = if min_x == usize::MAX {
            GlyphBounds::full_canvas()
        } else {
            GlyphBounds::new(
                min_x as f32 * factor,
                max_x as f32 * factor,
                min_y as f32 * factor,
                max_y as f32 * factor,
            )
        };

        let columns = scans
            .iter()
            .map(|scan| match scan.top {
                Some(top) => ColumnProfile {
                    top: top as f32 * cell,
                    bottom: scan.bottom as f32 * cell,
                    density: scan.count as f32 / (scan.bottom - top + 1) as f32,
                },
                None => ColumnProfile::empty(),
            })
            .collect();

        RasterProfile {
            bounds,
            raster: grid,
            columns,
            column_width: cell,
            resolution,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lettra_core::Variant;
    use std::sync::Arc;

    const RECT_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200"><rect x="20" y="10" width="100" height="180" fill="black"/></svg>"#;

    fn approx(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    /// Alpha plane with a filled rect `[x0, x1) × [y0, y1)`.
    fn plane(res: usize, x0: usize, x1: usize, y0: usize, y1: usize) -> Vec<u8> {
        let mut alpha = vec![0u8; res * res];
        for y in y0..y1 {
            for x in x0..x1 {
                alpha[y * res + x] = 255;
            }
        }
        alpha
    }

    #[test]
    fn test_stride_defaults() {
        let config = ProfilerConfig::default();
        assert_eq!(config.stride_for(200), 2);
        assert_eq!(config.stride_for(100), 1);
        let fixed = ProfilerConfig { stride: Some(0), ..Default::default() };
        assert_eq!(fixed.stride_for(200), 1);
    }

    #[test]
    fn test_profile_alpha_bounds() {
        let profiler = RasterProfiler::new(ProfilerConfig { stride: Some(1), ..Default::default() });
        let alpha = plane(200, 30, 71, 40, 161);
        let p = profiler.profile_alpha(&alpha, 200);
        assert_eq!(p.bounds, GlyphBounds::new(30.0, 70.0, 40.0, 160.0));
        assert_eq!(p.columns.len(), 200);
        assert_eq!(p.raster.coverage(), 41 * 121);
    }

    #[test]
    fn test_profile_alpha_columns() {
        let profiler = RasterProfiler::new(ProfilerConfig { stride: Some(1), ..Default::default() });
        let mut alpha = plane(200, 10, 11, 20, 41);
        // Punch a hole: column 10 has ink at 20..=40 except 30..35.
        for y in 30..35 {
            alpha[y * 200 + 10] = 0;
        }
        let p = profiler.profile_alpha(&alpha, 200);
        let col = p.columns[10];
        assert_eq!(col.top, 20.0);
        assert_eq!(col.bottom, 40.0);
        assert!(approx(col.density, 16.0 / 21.0, 1e-6));
        // Untouched column gets the default record.
        assert_eq!(p.columns[0], ColumnProfile::empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let profiler = RasterProfiler::new(ProfilerConfig { stride: Some(1), ..Default::default() });
        let mut alpha = vec![0u8; 10 * 10];
        alpha[5 * 10 + 5] = DEFAULT_ALPHA_THRESHOLD;
        assert!(!profiler.profile_alpha(&alpha, 10).has_ink());
        alpha[5 * 10 + 5] = DEFAULT_ALPHA_THRESHOLD + 1;
        assert!(profiler.profile_alpha(&alpha, 10).has_ink());
    }

    #[test]
    fn test_empty_raster_defaults_to_full_canvas() {
        let profiler = RasterProfiler::default();
        let alpha = vec![0u8; 200 * 200];
        let p = profiler.profile_alpha(&alpha, 200);
        assert_eq!(p.bounds, GlyphBounds::full_canvas());
        assert!(!p.has_ink());
        assert!(p.columns.iter().all(|c| *c == ColumnProfile::empty()));
    }

    #[test]
    fn test_rescale_to_canonical() {
        let profiler = RasterProfiler::new(ProfilerConfig { stride: Some(1), ..Default::default() });
        let alpha = plane(100, 10, 51, 5, 96);
        let p = profiler.profile_alpha(&alpha, 100);
        assert_eq!(p.bounds, GlyphBounds::new(20.0, 100.0, 10.0, 190.0));
        assert_eq!(p.column_width, 2.0);
    }

    #[test]
    fn test_stride_sampling() {
        let profiler = RasterProfiler::default();
        let alpha = plane(200, 20, 120, 10, 190);
        let p = profiler.profile_alpha(&alpha, 200);
        assert_eq!(p.columns.len(), 100);
        assert_eq!(p.column_width, 2.0);
        assert_eq!(p.bounds, GlyphBounds::new(20.0, 118.0, 10.0, 188.0));
    }

    #[test]
    fn test_profile_svg_rect() {
        let profiler = RasterProfiler::default();
        let p = profiler.profile(RECT_SVG).unwrap();
        assert!(approx(p.bounds.left, 20.0, 3.0), "left = {}", p.bounds.left);
        assert!(approx(p.bounds.right, 119.0, 3.0), "right = {}", p.bounds.right);
        assert!(approx(p.bounds.top, 10.0, 3.0));
        assert!(approx(p.bounds.bottom, 189.0, 3.0));
        assert!(p.bounds.left <= p.bounds.right);
        assert!(p.bounds.top <= p.bounds.bottom);
    }

    #[test]
    fn test_profile_svg_at_reduced_resolution() {
        let profiler = RasterProfiler::default();
        let full = profiler.profile_at(RECT_SVG, 200).unwrap();
        let reduced = profiler.profile_at(RECT_SVG, PRELOAD_RESOLUTION).unwrap();
        assert!(approx(full.bounds.left, reduced.bounds.left, 4.0));
        assert!(approx(full.bounds.right, reduced.bounds.right, 4.0));
        assert_eq!(reduced.resolution, PRELOAD_RESOLUTION);
    }

    #[test]
    fn test_malformed_markup() {
        let profiler = RasterProfiler::default();
        let err = profiler.profile("<svg><rect").unwrap_err();
        assert!(matches!(err, RasterError::Parse(_)));
        assert!(matches!(profiler.profile("not markup"), Err(RasterError::Parse(_))));
    }

    #[test]
    fn test_zero_resolution() {
        let profiler = RasterProfiler::default();
        assert!(matches!(
            profiler.profile_at(RECT_SVG, 0),
            Err(RasterError::Surface(0))
        ));
    }

    #[test]
    fn test_glyph_from_asset() {
        let profiler = RasterProfiler::default();
        let asset = ResolvedAsset {
            character: 'A',
            variant: Variant::First,
            markup: Arc::from(RECT_SVG),
        };
        let glyph = profiler.glyph(&asset, 200).unwrap();
        assert_eq!(glyph.character, 'A');
        assert_eq!(glyph.variant, Variant::First);
        assert_eq!(glyph.resolution, 200);
        assert!(glyph.scale > 0.0);
        assert!(glyph.column_at(60.0).unwrap().is_inked());
    }
}
