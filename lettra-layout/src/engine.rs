use std::sync::Arc;

use lettra_core::Glyph;
use thiserror::Error;

use crate::bounds::Aabb;

/// Content width above which the composition is scaled down to fit.
pub const DEFAULT_TARGET_WIDTH: f32 = 1000.0;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Expected {expected} overlap ratios for {glyphs} glyphs, got {actual}")]
    OverlapCountMismatch {
        glyphs: usize,
        expected: usize,
        actual: usize,
    },
}

/// One glyph placed on the baseline.
#[derive(Clone, Debug)]
pub struct PositionedGlyph {
    pub glyph: Arc<Glyph>,
    /// Anchor after translating the content box to x = 0.
    pub x: f32,
    /// Anchor as produced by the advance recurrence.
    pub raw_x: f32,
    /// Glyph scale × composition scale.
    pub scale: f32,
}

impl PositionedGlyph {
    /// Left edge of the ink, in content coordinates.
    pub fn ink_left(&self) -> f32 {
        self.x + self.glyph.bounds.left * self.scale
    }

    /// Right edge of the ink, in content coordinates.
    pub fn ink_right(&self) -> f32 {
        self.x + self.glyph.bounds.right * self.scale
    }
}

/// Laid-out text, ready for a renderer.
#[derive(Clone, Debug)]
pub struct Composition {
    pub glyphs: Vec<PositionedGlyph>,
    pub text: String,
    pub style: String,
    pub content_width: f32,
    pub content_height: f32,
    /// Vertical translation that moves the topmost ink to y = 0.
    pub offset_y: f32,
    /// Display scale keeping wide content within the target width.
    pub base_scale: f32,
}

impl Composition {
    /// Composition with no glyphs and a 1 × 1 content box.
    pub fn empty(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            glyphs: Vec::new(),
            text: text.into(),
            style: style.into(),
            content_width: 1.0,
            content_height: 1.0,
            offset_y: 0.0,
            base_scale: 1.0,
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Input of one [`LayoutComposer::compose`] call.
#[derive(Clone, Copy, Debug)]
pub struct LayoutRequest<'a> {
    pub text: &'a str,
    pub style: &'a str,
    pub glyphs: &'a [Arc<Glyph>],
    /// One ratio per adjacent pair.
    pub overlaps: &'a [f32],
    pub scale: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    pub target_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
        }
    }
}

/// Turns profiled glyphs and overlap ratios into a [`Composition`].
///
/// Each glyph advances by the ink width of its predecessor reduced by
/// their overlap ratio:
///
/// ```text
/// x[0] = -left[0]
/// x[i] = x[i-1] + width[i-1] * (1 - overlap[i-1, i]) - left[i]
/// ```
#[derive(Clone, Debug, Default)]
pub struct LayoutComposer {
    config: LayoutConfig,
}

impl LayoutComposer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, request: LayoutRequest<'_>) -> Result<Composition, LayoutError> {
        let LayoutRequest {
            text,
            style,
            glyphs,
            overlaps,
            scale,
        } = request;

        let expected = glyphs.len().saturating_sub(1);
        if overlaps.len() != expected {
            return Err(LayoutError::OverlapCountMismatch {
                glyphs: glyphs.len(),
                expected,
                actual: overlaps.len(),
            });
        }
        if glyphs.is_empty() {
            return Ok(Composition::empty(text, style));
        }

        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

        // ── Advance recurrence ──────────────────────────────────────
        let mut placed = Vec::with_capacity(glyphs.len());
        let mut content = Aabb::empty();
        let mut x = 0.0f32;

        for (i, glyph) in glyphs.iter().enumerate() {
            let s = glyph.scale * scale;
            x = if i == 0 {
                -glyph.bounds.left * s
            } else {
                let prev = &glyphs[i - 1];
                let advance = prev.bounds.width() * prev.scale * scale * (1.0 - overlaps[i - 1]);
                x + advance - glyph.bounds.left * s
            };

            content.include_x(x + glyph.bounds.left * s, x + glyph.bounds.right * s);
            if !glyph.is_blank() {
                content.include_y(glyph.bounds.top * s, glyph.bounds.bottom * s);
            }

            placed.push(PositionedGlyph {
                glyph: Arc::clone(glyph),
                x,
                raw_x: x,
                scale: s,
            });
        }

        // ── Normalize to the content box ────────────────────────────
        let shift = content.left();
        for p in &mut placed {
            p.x = p.raw_x - shift;
        }

        let content_width = content.width().max(1.0);
        let content_height = content.height().max(1.0);
        let base_scale = (self.config.target_width / content_width).min(1.0);

        log::debug!(
            "Composed {} glyphs: {content_width:.1} × {content_height:.1}, base scale {base_scale:.3}",
            placed.len()
        );

        Ok(Composition {
            glyphs: placed,
            text: text.to_owned(),
            style: style.to_owned(),
            content_width,
            content_height,
            offset_y: -content.top(),
            base_scale,
        })
    }
}

// ===================================================================
// Tests
// ===================================================================
