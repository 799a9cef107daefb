//! Serializable projection of a [`Composition`], without glyph markup.

use lettra_core::{GlyphBounds, Variant};
use lettra_layout::Composition;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphReport {
    pub character: char,
    pub variant: Variant,
    pub x: f32,
    pub raw_x: f32,
    pub scale: f32,
    pub bounds: GlyphBounds,
    /// Stand-in box used because the real asset was unusable.
    pub placeholder: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionReport {
    pub text: String,
    pub style: String,
    pub content_width: f32,
    pub content_height: f32,
    pub offset_y: f32,
    pub base_scale: f32,
    pub glyphs: Vec<GlyphReport>,
}

impl CompositionReport {
    /// Characters that were rendered as placeholders.
    pub fn placeholders(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs
            .iter()
            .filter(|g| g.placeholder)
            .map(|g| g.character)
    }
}

impl From<&Composition> for CompositionReport {
    fn from(composition: &Composition) -> Self {
        Self {
            text: composition.text.clone(),
            style: composition.style.clone(),
            content_width: composition.content_width,
            content_height: composition.content_height,
            offset_y: composition.offset_y,
            base_scale: composition.base_scale,
            glyphs: composition
                .glyphs
                .iter()
                .map(|p| GlyphReport {
                    character: p.glyph.character,
                    variant: p.glyph.variant,
                    x: p.x,
                    raw_x: p.raw_x,
                    scale: p.scale,
                    bounds: p.glyph.bounds,
                    placeholder: p.glyph.is_placeholder(),
                })
                .collect(),
        }
    }
}
