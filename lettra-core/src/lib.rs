//! # lettra-core
//!
//! Shared data model for the Lettra lettering engine: glyph geometry,
//! positional variants, style options, presets, and the undo/redo
//! history of generation parameters.
//!
//! ## Architecture
//!
//! ```text
//! StyleOptions + text ──► Snapshot ──► (caller) compose(snapshot)
//!                            ▲
//!                            │ replay(i)
//!                     HistoryManager
//! ```
//!
//! - **`glyph`**: `Glyph`, bounds, raster grid and column profiles.
//! - **`history`**: linear undo/redo stack over snapshots.
//! - **`preset`**: named style option bundles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod glyph;
pub mod history;
pub mod preset;

pub use glyph::{ColumnProfile, Glyph, GlyphBounds, RasterGrid, CANONICAL_SIZE};
pub use history::{HistoryEntry, HistoryManager, Snapshot};
pub use preset::{Preset, PresetRegistry};

// ── Variants ────────────────────────────────────────────────────────

/// Which rendering of a character a glyph was built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Standard,
    Alternate,
    First,
    Last,
}

/// Positional context of a character within the text.
///
/// Part of the glyph cache key: the same character can resolve to
/// different assets depending on where it sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantFlags {
    /// Character is the first of the text.
    pub first: bool,
    /// Character is the last of the text.
    pub last: bool,
    /// An alternate rendering was requested for this position.
    pub alternate: bool,
}

impl VariantFlags {
    /// Flags for the character at `index` in a text of `len` characters.
    pub fn at(index: usize, len: usize, alternate: bool) -> Self {
        Self {
            first: index == 0,
            last: len > 0 && index + 1 == len,
            alternate,
        }
    }
}

/// Normalize a character for asset and overlap lookups.
///
/// Alphabetic characters are lower-cased; digits, punctuation and
/// everything else pass through unchanged.
#[inline]
pub fn normalize_char(c: char) -> char {
    if c.is_alphabetic() {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    }
}

// ── Style options ───────────────────────────────────────────────────

/// Which overlap tiers the resolver chain is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    /// Precomputed table, falling back to rules on a miss.
    #[default]
    Table,
    /// Rule-based only.
    Rules,
    /// Table, falling back to an on-demand pixel-collision search.
    PixelCollision,
}

/// User-facing generation parameters recorded in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Asset style name (e.g. `"classic"`).
    pub style: String,
    /// Fill color, passed through to the rendering consumer.
    pub color: String,
    /// Per-glyph render scale. Must be positive.
    pub scale: f32,
    /// Use first/last variants where the style provides them.
    pub positional_variants: bool,
    /// Character indices that should use their alternate variant.
    pub alternates: BTreeSet<usize>,
    /// Overlap resolution strategy.
    pub overlap_mode: OverlapMode,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            style: String::from("classic"),
            color: String::from("#000000"),
            scale: 1.0,
            positional_variants: true,
            alternates: BTreeSet::new(),
            overlap_mode: OverlapMode::Table,
        }
    }
}

impl StyleOptions {
    /// Options for a named style with everything else at defaults.
    pub fn with_style(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..Default::default()
        }
    }

    /// Scale clamped to a usable positive value.
    pub fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    /// Variant flags for the character at `index` of a `len`-char text.
    pub fn flags_at(&self, index: usize, len: usize) -> VariantFlags {
        let mut flags = VariantFlags::at(index, len, self.alternates.contains(&index));
        if !self.positional_variants {
            flags.first = false;
            flags.last = false;
        }
        flags
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_alphabetic() {
        assert_eq!(normalize_char('A'), 'a');
        assert_eq!(normalize_char('z'), 'z');
        assert_eq!(normalize_char('Ä'), 'ä');
    }

    #[test]
    fn test_normalize_non_alphabetic() {
        assert_eq!(normalize_char('7'), '7');
        assert_eq!(normalize_char('!'), '!');
        assert_eq!(normalize_char(' '), ' ');
    }

    #[test]
    fn test_variant_flags_positions() {
        let first = VariantFlags::at(0, 3, false);
        assert!(first.first && !first.last);
        let last = VariantFlags::at(2, 3, true);
        assert!(!last.first && last.last && last.alternate);
        let single = VariantFlags::at(0, 1, false);
        assert!(single.first && single.last);
    }

    #[test]
    fn test_flags_without_positional_variants() {
        let options = StyleOptions {
            positional_variants: false,
            alternates: [1].into_iter().collect(),
            ..Default::default()
        };
        let flags = options.flags_at(0, 3);
        assert!(!flags.first);
        assert!(options.flags_at(1, 3).alternate);
    }

    #[test]
    fn test_effective_scale() {
        let mut options = StyleOptions::default();
        assert_eq!(options.effective_scale(), 1.0);
        options.scale = 0.0;
        assert_eq!(options.effective_scale(), 1.0);
        options.scale = 2.5;
        assert_eq!(options.effective_scale(), 2.5);
    }

    #[test]
    fn test_style_options_json_defaults() {
        let options: StyleOptions = serde_json::from_str(r#"{"style":"script"}"#).unwrap();
        assert_eq!(options.style, "script");
        assert_eq!(options.overlap_mode, OverlapMode::Table);
        assert!(options.positional_variants);
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(Variant::default(), Variant::Standard);
        assert_eq!(OverlapMode::default(), OverlapMode::Table);
    }

    #[test]
    fn test_overlap_mode_serde_names() {
        let json = serde_json::to_string(&OverlapMode::PixelCollision).unwrap();
        assert_eq!(json, "\"pixel_collision\"");
    }
}
