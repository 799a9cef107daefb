//! Glyph asset registry and variant resolution.
//!
//! Maps `(character, style, positional context)` to a concrete piece of
//! vector markup. Assets come from an [`AssetSource`]; the in-memory
//! [`AssetRegistry`] is the stock implementation and can be loaded from a
//! JSON manifest:
//!
//! ```json
//! { "styles": { "classic": {
//!     "positional_variants": true,
//!     "glyphs": { "a": { "standard": "<svg…>", "first": "<svg…>" } }
//! } } }
//! ```
//!
//! ## Selection order
//!
//! ```text
//! positional (first/last) ──► alternate ──► standard ──► any other
//!      │ style + asset + flag      │ requested + exists
//! ```
//!
//! Only the complete absence of assets for a character is an error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use lettra_core::{normalize_char, Variant, VariantFlags};
use serde::Deserialize;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("No asset for '{character}' in style '{style}'")]
    Missing { character: char, style: String },

    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("Malformed asset manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Failed to read asset manifest: {0}")]
    Io(#[from] std::io::Error),
}

// ── Source trait ────────────────────────────────────────────────────

/// Supplier of glyph markup. Owned externally, consumed read-only.
pub trait AssetSource: Send + Sync {
    /// Whether `style` exists at all.
    fn has_style(&self, style: &str) -> bool;

    /// Whether `style` ships first/last positional variants.
    fn supports_positional(&self, style: &str) -> bool;

    /// Markup for a normalized character's variant, if present.
    fn markup(&self, style: &str, character: char, variant: Variant) -> Option<Arc<str>>;
}

// ── In-memory registry ──────────────────────────────────────────────

/// All variants shipped for one character.
#[derive(Clone, Debug, Default)]
pub struct GlyphAssets {
    pub standard: Option<Arc<str>>,
    pub alternate: Option<Arc<str>>,
    pub first: Option<Arc<str>>,
    pub last: Option<Arc<str>>,
}

impl GlyphAssets {
    pub fn get(&self, variant: Variant) -> Option<&Arc<str>> {
        match variant {
            Variant::Standard => self.standard.as_ref(),
            Variant::Alternate => self.alternate.as_ref(),
            Variant::First => self.first.as_ref(),
            Variant::Last => self.last.as_ref(),
        }
    }

    pub fn set(&mut self, variant: Variant, markup: Arc<str>) {
        let slot = match variant {
            Variant::Standard => &mut self.standard,
            Variant::Alternate => &mut self.alternate,
            Variant::First => &mut self.first,
            Variant::Last => &mut self.last,
        };
        *slot = Some(markup);
    }
}

/// Assets of one style.
#[derive(Clone, Debug, Default)]
pub struct StyleAssets {
    pub positional_variants: bool,
    /// Normalized character → variants.
    pub glyphs: HashMap<char, GlyphAssets>,
}

/// In-memory [`AssetSource`].
#[derive(Clone, Debug, Default)]
pub struct AssetRegistry {
    styles: HashMap<String, StyleAssets>,
}

#[derive(Deserialize)]
struct Manifest {
    styles: HashMap<String, ManifestStyle>,
}

#[derive(Deserialize)]
struct ManifestStyle {
    #[serde(default)]
    positional_variants: bool,
    #[serde(default)]
    glyphs: HashMap<String, ManifestGlyph>,
}

#[derive(Deserialize)]
struct ManifestGlyph {
    standard: Option<String>,
    alternate: Option<String>,
    first: Option<String>,
    last: Option<String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON manifest.
    ///
    /// Glyph keys that are not exactly one character are skipped with a
    /// warning.
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let mut registry = Self::new();

        for (style_name, style) in manifest.styles {
            registry.add_style(&style_name, style.positional_variants);
            for (key, glyph) in style.glyphs {
                let mut chars = key.chars();
                let (Some(character), None) = (chars.next(), chars.next()) else {
                    log::warn!("Asset manifest: skipping key '{key}' in style '{style_name}'");
                    continue;
                };
                let variants = [
                    (Variant::Standard, glyph.standard),
                    (Variant::Alternate, glyph.alternate),
                    (Variant::First, glyph.first),
                    (Variant::Last, glyph.last),
                ];
                for (variant, markup) in variants {
                    if let Some(markup) = markup {
                        registry.insert(&style_name, character, variant, markup);
                    }
                }
            }
        }

        log::info!(
            "Loaded asset manifest: {} styles, {} glyphs",
            registry.styles.len(),
            registry.styles.values().map(|s| s.glyphs.len()).sum::<usize>(),
        );
        Ok(registry)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Register a style (no-op on the glyphs if it already exists).
    pub fn add_style(&mut self, style: &str, positional_variants: bool) {
        self.styles
            .entry(style.to_owned())
            .or_default()
            .positional_variants = positional_variants;
    }

    /// Register markup for a character variant. The character is
    /// normalized; unknown styles are created without positional support.
    pub fn insert(
        &mut self,
        style: &str,
        character: char,
        variant: Variant,
        markup: impl Into<Arc<str>>,
    ) {
        self.styles
            .entry(style.to_owned())
            .or_default()
            .glyphs
            .entry(normalize_char(character))
            .or_default()
            .set(variant, markup.into());
    }

    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

impl AssetSource for AssetRegistry {
    fn has_style(&self, style: &str) -> bool {
        self.styles.contains_key(style)
    }

    fn supports_positional(&self, style: &str) -> bool {
        self.styles.get(style).is_some_and(|s| s.positional_variants)
    }

    fn markup(&self, style: &str, character: char, variant: Variant) -> Option<Arc<str>> {
        self.styles
            .get(style)?
            .glyphs
            .get(&character)?
            .get(variant)
            .cloned()
    }
}

// ── Resolver ────────────────────────────────────────────────────────

/// A selected asset, ready for rasterization.
#[derive(Clone, Debug)]
pub struct ResolvedAsset {
    /// Character as it appeared in the text (not normalized).
    pub character: char,
    pub variant: Variant,
    pub markup: Arc<str>,
}

/// Chooses which variant of a character to render.
#[derive(Clone)]
pub struct AssetResolver {
    source: Arc<dyn AssetSource>,
}

impl AssetResolver {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<dyn AssetSource> {
        &self.source
    }

    /// Resolve the asset for `character` in `style` at the given position.
    pub fn resolve(
        &self,
        character: char,
        style: &str,
        flags: VariantFlags,
    ) -> Result<ResolvedAsset, AssetError> {
        if !self.source.has_style(style) {
            return Err(AssetError::UnknownStyle(style.to_owned()));
        }

        let key = normalize_char(character);
        let positional = self.source.supports_positional(style);

        let mut preferred = Vec::with_capacity(6);
        if positional && flags.first {
            preferred.push(Variant::First);
        }
        if positional && flags.last {
            preferred.push(Variant::Last);
        }
        if flags.alternate {
            preferred.push(Variant::Alternate);
        }
        // Fallbacks when the preferred variants are absent.
        preferred.extend([Variant::Standard, Variant::First, Variant::Last, Variant::Alternate]);

        preferred
            .into_iter()
            .find_map(|variant| {
                self.source
                    .markup(style, key, variant)
                    .map(|markup| ResolvedAsset { character, variant, markup })
            })
            .ok_or_else(|| AssetError::Missing {
                character,
                style: style.to_owned(),
            })
    }
}

// ===================================================================
// Tests
// ===================================================================
