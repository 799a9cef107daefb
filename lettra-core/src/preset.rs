//! Style presets, named bundles of [`StyleOptions`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{OverlapMode, StyleOptions};

/// A named set of style options a user can start from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable identifier recorded in history entries.
    pub id: String,
    /// Display name.
    pub name: String,
    pub options: StyleOptions,
}

/// Lookup of presets by id.
#[derive(Clone, Debug)]
pub struct PresetRegistry {
    presets: BTreeMap<String, Preset>,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetRegistry {
    /// Registry with no presets.
    pub fn empty() -> Self {
        Self {
            presets: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in presets.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert(Preset {
            id: "classic".into(),
            name: "Classic".into(),
            options: StyleOptions::with_style("classic"),
        });
        registry.insert(Preset {
            id: "bold-script".into(),
            name: "Bold Script".into(),
            options: StyleOptions {
                style: "script".into(),
                color: "#1a1a2e".into(),
                scale: 1.2,
                ..Default::default()
            },
        });
        registry.insert(Preset {
            id: "compact".into(),
            name: "Compact".into(),
            options: StyleOptions {
                style: "classic".into(),
                scale: 0.8,
                positional_variants: false,
                overlap_mode: OverlapMode::Rules,
                ..Default::default()
            },
        });
        registry
    }

    /// Add or replace a preset. Returns the one it replaced.
    pub fn insert(&mut self, preset: Preset) -> Option<Preset> {
        self.presets.insert(preset.id.clone(), preset)
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.get(id)
    }

    /// Options of preset `id`, cloned for a new generation.
    pub fn options(&self, id: &str) -> Option<StyleOptions> {
        self.get(id).map(|p| p.options.clone())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
