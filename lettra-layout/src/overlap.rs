//! Overlap ("kerning") resolution between adjacent glyphs.
//!
//! An overlap ratio is the fraction of the previous glyph's ink width
//! that the next glyph may slide over. Ratios come from an ordered chain
//! of strategies; the first one that answers wins:
//!
//! ```text
//!  (prev, curr) ──► TableLookup ──miss──► RuleBased
//!                       │                    │
//!                       └──────hit───────────┴──► ratio
//!
//!  PixelCollision mode: TableLookup ──miss──► PixelCollision
//! ```
//!
//! Whitespace on either side always yields 0.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use lettra_core::{normalize_char, Glyph, OverlapMode};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

/// Multiplier applied to `max` for exception pairs.
pub const EXCEPTION_FACTOR: f32 = 0.7;

/// Candidate step of the pixel-collision scan.
pub const PIXEL_STEP: f32 = 0.005;

/// Upper clamp for table ratios, keeping them strictly below 1.
pub const MAX_TABLE_RATIO: f32 = 0.999;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Malformed overlap table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read overlap table: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Malformed overlap rules: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read overlap rules: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid rule {subject} in style '{style}': need 0 <= min ({min}) <= max ({max}) < 1")]
    InvalidRange {
        style: String,
        subject: String,
        min: f32,
        max: f32,
    },

    #[error("Special case '{next}' in style '{style}' has ratio {ratio} outside [0, 1)")]
    InvalidSpecialCase { style: String, next: char, ratio: f32 },

    #[error("Exception pair {0:?} in style '{1}' must be exactly two characters")]
    InvalidException(String, String),
}

/// Interpret a JSON key as a single character.
fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

// ── Lookup table ────────────────────────────────────────────────────

/// Precomputed per-style pair ratios: style → prev → next → ratio.
#[derive(Clone, Debug, Default)]
pub struct OverlapTable {
    styles: FxHashMap<String, FxHashMap<(char, char), f32>>,
}

impl OverlapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the nested JSON form `{ style: { prev: { next: ratio } } }`.
    ///
    /// Keys that are not single characters are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let raw: HashMap<String, HashMap<String, HashMap<String, f32>>> =
            serde_json::from_str(json)?;

        let mut table = Self::new();
        for (style, prevs) in raw {
            for (prev_key, nexts) in prevs {
                let Some(prev) = single_char(&prev_key) else {
                    log::warn!("Overlap table '{style}': skipping key {prev_key:?}");
                    continue;
                };
                for (next_key, ratio) in nexts {
                    let Some(next) = single_char(&next_key) else {
                        log::warn!("Overlap table '{style}': skipping key {next_key:?}");
                        continue;
                    };
                    table.insert(&style, prev, next, ratio);
                }
            }
        }
        log::info!(
            "Loaded overlap table: {} styles, {} pairs",
            table.styles.len(),
            table.len()
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Store a ratio, clamped into `[0, 1)`.
    pub fn insert(&mut self, style: &str, prev: char, next: char, ratio: f32) {
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, MAX_TABLE_RATIO)
        } else {
            0.0
        };
        self.styles
            .entry(style.to_owned())
            .or_default()
            .insert((normalize_char(prev), normalize_char(next)), ratio);
    }

    pub fn lookup(&self, style: &str, prev: char, next: char) -> Option<f32> {
        self.styles
            .get(style)?
            .get(&(normalize_char(prev), normalize_char(next)))
            .copied()
    }

    /// Total number of pairs across styles.
    pub fn len(&self) -> usize {
        self.styles.values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Rules ───────────────────────────────────────────────────────────

/// Overlap bounds for glyphs following one character.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapRule {
    pub min_overlap: f32,
    pub max_overlap: f32,
    /// Next character → ratio replacing `max_overlap`.
    pub special_cases: FxHashMap<char, f32>,
}

impl Default for OverlapRule {
    fn default() -> Self {
        Self::new(0.05, 0.15)
    }
}

impl OverlapRule {
    pub fn new(min_overlap: f32, max_overlap: f32) -> Self {
        Self {
            min_overlap,
            max_overlap,
            special_cases: FxHashMap::default(),
        }
    }

    pub fn with_special_case(mut self, next: char, ratio: f32) -> Self {
        self.special_cases.insert(normalize_char(next), ratio);
        self
    }

    fn validate(&self, style: &str, subject: &str) -> Result<(), RuleError> {
        let (min, max) = (self.min_overlap, self.max_overlap);
        if !(0.0..1.0).contains(&min) || !(min..1.0).contains(&max) {
            return Err(RuleError::InvalidRange {
                style: style.to_owned(),
                subject: subject.to_owned(),
                min,
                max,
            });
        }
        for (&next, &ratio) in &self.special_cases {
            if !(0.0..1.0).contains(&ratio) {
                return Err(RuleError::InvalidSpecialCase {
                    style: style.to_owned(),
                    next,
                    ratio,
                });
            }
        }
        Ok(())
    }
}

/// All rules of one style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlapRuleSet {
    pub default_rule: OverlapRule,
    pub rules: FxHashMap<char, OverlapRule>,
    /// Pairs whose maximum is reduced by [`EXCEPTION_FACTOR`].
    pub exceptions: FxHashSet<(char, char)>,
}

impl OverlapRuleSet {
    pub fn new(default_rule: OverlapRule) -> Self {
        Self {
            default_rule,
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, prev: char, rule: OverlapRule) -> Self {
        self.rules.insert(normalize_char(prev), rule);
        self
    }

    pub fn with_exception(mut self, prev: char, next: char) -> Self {
        self.exceptions
            .insert((normalize_char(prev), normalize_char(next)));
        self
    }

    /// Rule governing glyphs after `prev`.
    pub fn rule_for(&self, prev: char) -> &OverlapRule {
        self.rules
            .get(&normalize_char(prev))
            .unwrap_or(&self.default_rule)
    }

    /// Effective `(min, max)` for a pair after special cases and
    /// exceptions are applied.
    pub fn range(&self, prev: char, next: char) -> (f32, f32) {
        let (prev, next) = (normalize_char(prev), normalize_char(next));
        let rule = self.rule_for(prev);
        let min = rule.min_overlap;
        let mut max = rule
            .special_cases
            .get(&next)
            .copied()
            .unwrap_or(rule.max_overlap);
        if self.exceptions.contains(&(prev, next)) {
            max = min.max(max * EXCEPTION_FACTOR);
        }
        (min, max)
    }

    pub fn validate(&self, style: &str) -> Result<(), RuleError> {
        self.default_rule.validate(style, "default")?;
        for (prev, rule) in &self.rules {
            rule.validate(style, &format!("'{prev}'"))?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawRule {
    min_overlap: f32,
    max_overlap: f32,
    #[serde(default)]
    special_cases: HashMap<String, f32>,
}

#[derive(Deserialize)]
struct RawRuleSet {
    #[serde(default)]
    default_rule: Option<RawRule>,
    #[serde(default)]
    rules: HashMap<String, RawRule>,
    #[serde(default)]
    exceptions: Vec<String>,
}

#[derive(Deserialize)]
struct RawRules {
    #[serde(default)]
    fallback: Option<RawRuleSet>,
    #[serde(default)]
    styles: HashMap<String, RawRuleSet>,
}

impl RawRule {
    fn into_rule(self, style: &str) -> OverlapRule {
        let mut rule = OverlapRule::new(self.min_overlap, self.max_overlap);
        for (key, ratio) in self.special_cases {
            match single_char(&key) {
                Some(next) => rule = rule.with_special_case(next, ratio),
                None => log::warn!("Overlap rules '{style}': skipping special case {key:?}"),
            }
        }
        rule
    }
}

impl RawRuleSet {
    fn into_set(self, style: &str) -> Result<OverlapRuleSet, RuleError> {
        let default_rule = self
            .default_rule
            .map(|r| r.into_rule(style))
            .unwrap_or_default();
        let mut set = OverlapRuleSet::new(default_rule);

        for (key, raw) in self.rules {
            match single_char(&key) {
                Some(prev) => set = set.with_rule(prev, raw.into_rule(style)),
                None => log::warn!("Overlap rules '{style}': skipping rule {key:?}"),
            }
        }
        for pair in self.exceptions {
            let mut chars = pair.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some(prev), Some(next), None) => set = set.with_exception(prev, next),
                _ => return Err(RuleError::InvalidException(pair, style.to_owned())),
            }
        }
        set.validate(style)?;
        Ok(set)
    }
}

/// Rule sets for every style plus the set used for unknown styles.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapRules {
    styles: FxHashMap<String, OverlapRuleSet>,
    fallback: OverlapRuleSet,
}

impl Default for OverlapRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OverlapRules {
    /// Defaults used when no rules file is supplied.
    pub fn builtin() -> Self {
        let classic = OverlapRuleSet::new(OverlapRule::new(0.05, 0.15))
            .with_rule('o', OverlapRule::new(0.08, 0.2))
            .with_rule('t', OverlapRule::new(0.02, 0.1).with_special_case('h', 0.18))
            .with_rule('f', OverlapRule::new(0.02, 0.08))
            .with_exception('r', 'n')
            .with_exception('v', 'v')
            .with_exception('w', 'w');
        let script = OverlapRuleSet::new(OverlapRule::new(0.1, 0.22))
            .with_rule('l', OverlapRule::new(0.12, 0.25))
            .with_exception('o', 'o');

        let mut styles = FxHashMap::default();
        styles.insert("classic".to_owned(), classic);
        styles.insert("script".to_owned(), script);
        Self {
            styles,
            fallback: OverlapRuleSet::default(),
        }
    }

    /// Parse `{ "fallback": {...}, "styles": { name: {...} } }`.
    ///
    /// Every rule is validated; an invalid range rejects the whole file.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let raw: RawRules = serde_json::from_str(json)?;
        let fallback = match raw.fallback {
            Some(set) => set.into_set("fallback")?,
            None => OverlapRuleSet::default(),
        };
        let mut styles = FxHashMap::default();
        for (style, set) in raw.styles {
            let set = set.into_set(&style)?;
            styles.insert(style, set);
        }
        log::info!("Loaded overlap rules for {} styles", styles.len());
        Ok(Self { styles, fallback })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, style: &str, set: OverlapRuleSet) -> Result<(), RuleError> {
        set.validate(style)?;
        self.styles.insert(style.to_owned(), set);
        Ok(())
    }

    pub fn rule_set(&self, style: &str) -> &OverlapRuleSet {
        self.styles.get(style).unwrap_or(&self.fallback)
    }
}

// ── Strategies ──────────────────────────────────────────────────────

/// Everything a strategy may consult for one adjacent pair.
pub struct OverlapContext<'a> {
    pub style: &'a str,
    /// Normalized previous character.
    pub prev: char,
    /// Normalized current character.
    pub next: char,
    pub table: &'a OverlapTable,
    pub rules: &'a OverlapRuleSet,
}

/// One tier of the resolution chain. `None` falls through to the next.
pub trait OverlapStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, ctx: &OverlapContext<'_>, prev: &Glyph, curr: &Glyph) -> Option<f32>;
}

/// Precomputed table hit.
pub struct TableLookup;

impl OverlapStrategy for TableLookup {
    fn name(&self) -> &'static str {
        "table"
    }

    fn resolve(&self, ctx: &OverlapContext<'_>, _prev: &Glyph, _curr: &Glyph) -> Option<f32> {
        ctx.table.lookup(ctx.style, ctx.prev, ctx.next)
    }
}

/// The pair's maximum after special cases and exceptions.
pub struct RuleBased;

impl OverlapStrategy for RuleBased {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn resolve(&self, ctx: &OverlapContext<'_>, _prev: &Glyph, _curr: &Glyph) -> Option<f32> {
        Some(ctx.rules.range(ctx.prev, ctx.next).1)
    }
}

/// Scans candidate ratios from max down to min and stops at the first
/// one where inked columns of both glyphs meet.
///
/// Greedy: the first colliding candidate is returned as is. Without any
/// collision the pair's minimum is returned.
pub struct PixelCollision;

impl PixelCollision {
    /// Whether `curr`, placed `offset` units right of `prev`'s left ink
    /// edge, has an inked column touching one of `prev`'s.
    pub fn collides(prev: &Glyph, curr: &Glyph, offset: f32) -> bool {
        let region = prev.bounds.width() - offset;
        if region <= 0.0 {
            return false;
        }
        (0..region.ceil() as usize).any(|k| {
            let k = k as f32;
            let a = prev.column_at(prev.bounds.left + offset + k);
            let b = curr.column_at(curr.bounds.left + k);
            matches!(
                (a, b),
                (Some(a), Some(b)) if a.is_inked() && b.is_inked() && a.overlaps_vertically(b)
            )
        })
    }
}

impl OverlapStrategy for PixelCollision {
    fn name(&self) -> &'static str {
        "pixel"
    }

    fn resolve(&self, ctx: &OverlapContext<'_>, prev: &Glyph, curr: &Glyph) -> Option<f32> {
        let (min, max) = ctx.rules.range(ctx.prev, ctx.next);
        let width = prev.bounds.width();
        let steps = ((max - min) / PIXEL_STEP + 1e-4).floor().max(0.0) as usize;

        for i in 0..=steps {
            let candidate = (max - i as f32 * PIXEL_STEP).max(min);
            if Self::collides(prev, curr, width * (1.0 - candidate)) {
                return Some(candidate);
            }
        }
        Some(min)
    }
}

// ── Resolver ────────────────────────────────────────────────────────

/// Ordered strategy chain over shared table and rules.
pub struct OverlapResolver {
    table: Arc<OverlapTable>,
    rules: Arc<OverlapRules>,
    chain: Vec<Box<dyn OverlapStrategy>>,
}

impl OverlapResolver {
    /// Build the chain for `mode`.
    pub fn new(table: Arc<OverlapTable>, rules: Arc<OverlapRules>, mode: OverlapMode) -> Self {
        let chain: Vec<Box<dyn OverlapStrategy>> = match mode {
            OverlapMode::Table => vec![Box::new(TableLookup), Box::new(RuleBased)],
            OverlapMode::Rules => vec![Box::new(RuleBased)],
            OverlapMode::PixelCollision => vec![Box::new(TableLookup), Box::new(PixelCollision)],
        };
        Self::with_chain(table, rules, chain)
    }

    /// Build with an explicit chain.
    pub fn with_chain(
        table: Arc<OverlapTable>,
        rules: Arc<OverlapRules>,
        chain: Vec<Box<dyn OverlapStrategy>>,
    ) -> Self {
        Self { table, rules, chain }
    }

    /// Names of the strategies in evaluation order.
    pub fn chain(&self) -> Vec<&'static str> {
        self.chain.iter().map(|s| s.name()).collect()
    }

    /// Ratio for one adjacent pair.
    pub fn resolve(&self, style: &str, prev: &Glyph, curr: &Glyph) -> f32 {
        if prev.is_space() || curr.is_space() {
            return 0.0;
        }
        let ctx = OverlapContext {
            style,
            prev: normalize_char(prev.character),
            next: normalize_char(curr.character),
            table: &self.table,
            rules: self.rules.rule_set(style),
        };
        for strategy in &self.chain {
            if let Some(ratio) = strategy.resolve(&ctx, prev, curr) {
                log::trace!(
                    "Overlap '{}{}' = {ratio} ({})",
                    ctx.prev,
                    ctx.next,
                    strategy.name()
                );
                return ratio;
            }
        }
        0.0
    }

    /// Ratios for every adjacent pair; `glyphs.len() - 1` values.
    pub fn resolve_all<G: AsRef<Glyph>>(&self, style: &str, glyphs: &[G]) -> Vec<f32> {
        glyphs
            .windows(2)
            .map(|pair| self.resolve(style, pair[0].as_ref(), pair[1].as_ref()))
            .collect()
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lettra_core::ColumnProfile;

    fn glyph(c: char) -> Glyph {
        Glyph::placeholder(c)
    }

    /// Placeholder with all columns at or right of `x` emptied.
    fn glyph_inked_until(c: char, x: f32) -> Glyph {
        let mut g = glyph(c);
        let width = g.column_width;
        for (i, col) in g.columns.iter_mut().enumerate() {
            if i as f32 * width >= x {
                *col = ColumnProfile::empty();
            }
        }
        g
    }

    fn rules_with(set: OverlapRuleSet) -> Arc<OverlapRules> {
        let mut rules = OverlapRules::builtin();
        rules.insert("test", set).unwrap();
        Arc::new(rules)
    }

    fn resolver(mode: OverlapMode, table: OverlapTable, set: OverlapRuleSet) -> OverlapResolver {
        OverlapResolver::new(Arc::new(table), rules_with(set), mode)
    }

    // ── Table ───────────────────────────────────────────────────────

    #[test]
    fn test_table_from_json() {
        let table = OverlapTable::from_json(
            r#"{ "classic": { "a": { "b": 0.12, "c": 1.5 }, "xx": { "b": 0.3 } } }"#,
        )
        .unwrap();
        assert_eq!(table.lookup("classic", 'A', 'B'), Some(0.12));
        assert_eq!(table.lookup("classic", 'a', 'c'), Some(MAX_TABLE_RATIO));
        assert_eq!(table.lookup("script", 'a', 'b'), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_malformed_json() {
        assert!(matches!(
            OverlapTable::from_json("{ not json"),
            Err(TableError::Json(_))
        ));
    }

    #[test]
    fn test_table_hit_wins() {
        let mut table = OverlapTable::new();
        table.insert("test", 'a', 'b', 0.12);
        let r = resolver(OverlapMode::Table, table, OverlapRuleSet::default());
        assert_eq!(r.resolve("test", &glyph('A'), &glyph('B')), 0.12);
    }

    #[test]
    fn test_table_miss_falls_through_to_rules() {
        let r = resolver(
            OverlapMode::Table,
            OverlapTable::new(),
            OverlapRuleSet::new(OverlapRule::new(0.02, 0.2)),
        );
        assert_eq!(r.resolve("test", &glyph('a'), &glyph('b')), 0.2);
    }

    // ── Rules ───────────────────────────────────────────────────────

    #[test]
    fn test_rule_special_case_overrides_max() {
        let set = OverlapRuleSet::new(OverlapRule::new(0.02, 0.2))
            .with_rule('t', OverlapRule::new(0.02, 0.1).with_special_case('h', 0.18));
        assert_eq!(set.range('t', 'h'), (0.02, 0.18));
        assert_eq!(set.range('t', 'o'), (0.02, 0.1));
        assert_eq!(set.range('q', 'o'), (0.02, 0.2));
    }

    #[test]
    fn test_rule_exception_reduces_max() {
        let set = OverlapRuleSet::new(OverlapRule::new(0.05, 0.2)).with_exception('r', 'n');
        let (min, max) = set.range('R', 'N');
        assert_eq!(min, 0.05);
        assert!((max - 0.14).abs() < 1e-6);
    }

    #[test]
    fn test_rule_exception_floored_at_min() {
        let set = OverlapRuleSet::new(OverlapRule::new(0.1, 0.12)).with_exception('a', 'a');
        assert_eq!(set.range('a', 'a'), (0.1, 0.1));
    }

    #[test]
    fn test_rules_ratio_within_range() {
        let rules = OverlapRules::builtin();
        let r = OverlapResolver::new(Arc::new(OverlapTable::new()), Arc::new(rules.clone()), OverlapMode::Rules);
        for (p, n) in [('t', 'h'), ('r', 'n'), ('o', 'x'), ('a', 'b')] {
            let set = rules.rule_set("classic");
            let (min, max) = set.range(p, n);
            let ratio = r.resolve("classic", &glyph(p), &glyph(n));
            assert!(ratio >= min && ratio <= max, "{p}{n}: {ratio} not in [{min}, {max}]");
        }
    }

    #[test]
    fn test_rules_from_json() {
        let rules = OverlapRules::from_json(
            r#"{
                "fallback": { "default_rule": { "min_overlap": 0.0, "max_overlap": 0.1 } },
                "styles": {
                    "classic": {
                        "default_rule": { "min_overlap": 0.05, "max_overlap": 0.15 },
                        "rules": { "t": { "min_overlap": 0.02, "max_overlap": 0.1, "special_cases": { "H": 0.18 } } },
                        "exceptions": ["rn"]
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(rules.rule_set("classic").range('t', 'h'), (0.02, 0.18));
        assert!(rules.rule_set("classic").exceptions.contains(&('r', 'n')));
        assert_eq!(rules.rule_set("gothic").range('a', 'b'), (0.0, 0.1));
    }

    #[test]
    fn test_rules_reject_invalid_range() {
        let err = OverlapRules::from_json(
            r#"{ "styles": { "classic": { "default_rule": { "min_overlap": 0.3, "max_overlap": 0.1 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::InvalidRange { .. }));

        let err = OverlapRules::from_json(
            r#"{ "styles": { "classic": { "rules": { "a": { "min_overlap": 0.1, "max_overlap": 1.0 } } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::InvalidRange { .. }));
    }

    #[test]
    fn test_rules_reject_bad_exception() {
        let err = OverlapRules::from_json(r#"{ "styles": { "classic": { "exceptions": ["abc"] } } }"#)
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidException(..)));
    }

    #[test]
    fn test_rules_reject_bad_special_case() {
        let mut rules = OverlapRules::builtin();
        let set = OverlapRuleSet::new(OverlapRule::new(0.0, 0.1).with_special_case('x', 1.2));
        assert!(matches!(
            rules.insert("bad", set),
            Err(RuleError::InvalidSpecialCase { next: 'x', .. })
        ));
    }

    // ── Pixel collision ─────────────────────────────────────────────

    #[test]
    fn test_pixel_solid_glyphs_collide_at_max() {
        let r = resolver(
            OverlapMode::PixelCollision,
            OverlapTable::new(),
            OverlapRuleSet::new(OverlapRule::new(0.02, 0.15)),
        );
        assert_eq!(r.resolve("test", &glyph('a'), &glyph('b')), 0.15);
    }

    #[test]
    fn test_pixel_no_collision_returns_min() {
        // Previous glyph has no ink in its right half.
        let prev = glyph_inked_until('a', 100.0);
        let r = resolver(
            OverlapMode::PixelCollision,
            OverlapTable::new(),
            OverlapRuleSet::new(OverlapRule::new(0.02, 0.15)),
        );
        assert_eq!(r.resolve("test", &prev, &glyph('b')), 0.02);
    }

    #[test]
    fn test_pixel_vertical_separation_does_not_collide() {
        let mut curr = glyph('b');
        for col in curr.columns.iter_mut().filter(|c| c.density > 0.0) {
            col.top = 0.0;
            col.bottom = 10.0;
        }
        let r = resolver(
            OverlapMode::PixelCollision,
            OverlapTable::new(),
            OverlapRuleSet::new(OverlapRule::new(0.0, 0.1)),
        );
        assert_eq!(r.resolve("test", &glyph('a'), &curr), 0.0);
    }

    #[test]
    fn test_pixel_greedy_scan_finds_first_contact() {
        // Ink until x=164 still meets the first candidate, so the scan
        // stops there without trying smaller overlaps.
        let prev = glyph_inked_until('a', 164.0);
        let set = OverlapRuleSet::new(OverlapRule::new(0.0, 0.2));
        let r = resolver(OverlapMode::PixelCollision, OverlapTable::new(), set);
        assert_eq!(r.resolve("test", &prev, &glyph('b')), 0.2);
    }

    #[test]
    fn test_pixel_collides_helper() {
        let a = glyph('a');
        let b = glyph('b');
        assert!(PixelCollision::collides(&a, &b, 100.0));
        assert!(!PixelCollision::collides(&a, &b, a.bounds.width()));
    }

    // ── Resolver ────────────────────────────────────────────────────

    #[test]
    fn test_space_forces_zero() {
        let mut table = OverlapTable::new();
        table.insert("test", 'a', ' ', 0.5);
        let r = resolver(OverlapMode::Table, table, OverlapRuleSet::default());
        let space = Glyph::space(' ', 60.0);
        assert_eq!(r.resolve("test", &glyph('a'), &space), 0.0);
        assert_eq!(r.resolve("test", &space, &glyph('a')), 0.0);
    }

    #[test]
    fn test_chain_by_mode() {
        let table = Arc::new(OverlapTable::new());
        let rules = Arc::new(OverlapRules::builtin());
        let chain = |mode| OverlapResolver::new(table.clone(), rules.clone(), mode).chain();
        assert_eq!(chain(OverlapMode::Table), vec!["table", "rules"]);
        assert_eq!(chain(OverlapMode::Rules), vec!["rules"]);
        assert_eq!(chain(OverlapMode::PixelCollision), vec!["table", "pixel"]);
    }

    #[test]
    fn test_resolve_all_counts_pairs() {
        let r = resolver(OverlapMode::Rules, OverlapTable::new(), OverlapRuleSet::default());
        let glyphs: Vec<Arc<Glyph>> = "abc".chars().map(|c| Arc::new(glyph(c))).collect();
        assert_eq!(r.resolve_all("test", &glyphs).len(), 2);
        assert!(r.resolve_all::<Arc<Glyph>>("test", &[]).is_empty());
    }
}
