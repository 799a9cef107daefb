//! Time-bounded store of profiled glyphs.
//!
//! Entries live for a fixed TTL (default 30 minutes) and are additionally
//! bounded by an LRU capacity so long sessions across many styles cannot
//! grow without limit. Expired entries are evicted lazily on read, or in
//! bulk with [`GlyphCache::purge_expired`].
//!
//! The cache is a plain value owned by whoever builds the pipeline; it is
//! never a process-wide singleton.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lettra_core::{normalize_char, Glyph, VariantFlags};
use lru::LruCache;

/// Default time-to-live of a cached glyph.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default maximum number of cached glyphs.
pub const DEFAULT_CAPACITY: usize = 512;

/// Identity of a cached glyph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Normalized character.
    pub character: char,
    pub flags: VariantFlags,
    pub style: String,
}

impl CacheKey {
    pub fn new(character: char, flags: VariantFlags, style: impl Into<String>) -> Self {
        Self {
            character: normalize_char(character),
            flags,
            style: style.into(),
        }
    }
}

/// A stored glyph and when it was stored.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub glyph: Arc<Glyph>,
    pub inserted_at: Instant,
}

/// What a [`GlyphCache::clear`] call removes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Every entry keyed on this style.
    Style(String),
    /// Everything.
    All,
}

#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because their TTL ran out.
    pub expirations: u64,
    /// Entries dropped to respect the capacity.
    pub evictions: u64,
}

/// TTL + LRU glyph store.
pub struct GlyphCache {
    entries: LruCache<CacheKey, CacheEntry>,
    ttl: Duration,
    stats: CacheStats,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl GlyphCache {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl: config.ttl,
            stats: CacheStats::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Look up a glyph, evicting it if it outlived the TTL.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<Glyph>> {
        self.get_at(key, Instant::now())
    }

    /// [`get`](Self::get) against an explicit clock reading.
    pub fn get_at(&mut self, key: &CacheKey, now: Instant) -> Option<Arc<Glyph>> {
        let ttl = self.ttl;
        let fresh = match self.entries.get(key) {
            Some(entry) => is_fresh(entry, now, ttl),
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if !fresh {
            self.entries.pop(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            return None;
        }

        self.stats.hits += 1;
        self.entries.get(key).map(|e| Arc::clone(&e.glyph))
    }

    /// Whether a fresh entry exists, without touching stats or LRU order.
    pub fn contains(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        self.entries
            .peek(key)
            .is_some_and(|entry| is_fresh(entry, now, self.ttl))
    }

    /// Store a glyph stamped with the current time.
    pub fn insert(&mut self, key: CacheKey, glyph: Arc<Glyph>) {
        self.insert_at(key, glyph, Instant::now());
    }

    pub fn insert_at(&mut self, key: CacheKey, glyph: Arc<Glyph>, now: Instant) {
        let entry = CacheEntry {
            glyph,
            inserted_at: now,
        };
        if let Some((evicted, _)) = self.entries.push(key.clone(), entry) {
            if evicted != key {
                self.stats.evictions += 1;
            }
        }
    }

    /// Remove entries in `scope`. Returns how many were removed.
    pub fn clear(&mut self, scope: Scope) -> usize {
        let removed = match scope {
            Scope::All => {
                let n = self.entries.len();
                self.entries.clear();
                n
            }
            Scope::Style(style) => {
                let keys: Vec<CacheKey> = self
                    .entries
                    .iter()
                    .filter(|(k, _)| k.style == style)
                    .map(|(k, _)| k.clone())
                    .collect();
                for key in &keys {
                    self.entries.pop(key);
                }
                keys.len()
            }
        };
        log::debug!("Glyph cache: cleared {removed} entries");
        removed
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, e)| !is_fresh(e, now, self.ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            self.entries.pop(key);
        }
        self.stats.expirations += stale.len() as u64;
        stale.len()
    }
}

#[inline]
fn is_fresh(entry: &CacheEntry, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(entry.inserted_at) < ttl
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char, style: &str) -> CacheKey {
        CacheKey::new(c, VariantFlags::default(), style)
    }

    fn glyph(c: char) -> Arc<Glyph> {
        Arc::new(Glyph::placeholder(c))
    }

    #[test]
    fn test_key_normalizes_character() {
        assert_eq!(key('A', "classic"), key('a', "classic"));
        assert_ne!(key('a', "classic"), key('a', "script"));
        let first = CacheKey::new('a', VariantFlags { first: true, ..Default::default() }, "classic");
        assert_ne!(first, key('a', "classic"));
    }

    #[test]
    fn test_hit_returns_same_instance() {
        let mut cache = GlyphCache::default();
        let g = glyph('a');
        cache.insert(key('a', "classic"), Arc::clone(&g));
        let first = cache.get(&key('a', "classic")).unwrap();
        let second = cache.get(&key('A', "classic")).unwrap();
        assert!(Arc::ptr_eq(&first, &g));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_miss() {
        let mut cache = GlyphCache::default();
        assert!(cache.get(&key('x', "classic")).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let mut cache = GlyphCache::new(CacheConfig {
            ttl: Duration::from_secs(60),
            capacity: 8,
        });
        let start = Instant::now();
        cache.insert_at(key('a', "classic"), glyph('a'), start);

        assert!(cache.get_at(&key('a', "classic"), start + Duration::from_secs(59)).is_some());
        assert!(cache.get_at(&key('a', "classic"), start + Duration::from_secs(60)).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let mut cache = GlyphCache::new(CacheConfig {
            ttl: Duration::ZERO,
            capacity: 8,
        });
        cache.insert(key('a', "classic"), glyph('a'));
        assert!(!cache.contains(&key('a', "classic")));
        assert!(cache.get(&key('a', "classic")).is_none());
    }

    #[test]
    fn test_clear_style_scope() {
        let mut cache = GlyphCache::default();
        cache.insert(key('a', "classic"), glyph('a'));
        cache.insert(key('b', "classic"), glyph('b'));
        cache.insert(key('a', "script"), glyph('a'));

        assert_eq!(cache.clear(Scope::Style("classic".into())), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key('a', "script")));
    }

    #[test]
    fn test_clear_all() {
        let mut cache = GlyphCache::default();
        cache.insert(key('a', "classic"), glyph('a'));
        cache.insert(key('a', "script"), glyph('a'));
        assert_eq!(cache.clear(Scope::All), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let mut cache = GlyphCache::new(CacheConfig {
            ttl: DEFAULT_TTL,
            capacity: 2,
        });
        cache.insert(key('a', "s"), glyph('a'));
        cache.insert(key('b', "s"), glyph('b'));
        cache.get(&key('a', "s"));
        cache.insert(key('c', "s"), glyph('c'));

        assert!(cache.contains(&key('a', "s")));
        assert!(!cache.contains(&key('b', "s")));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_same_key_is_not_eviction() {
        let mut cache = GlyphCache::new(CacheConfig {
            ttl: DEFAULT_TTL,
            capacity: 1,
        });
        cache.insert(key('a', "s"), glyph('a'));
        cache.insert(key('a', "s"), glyph('a'));
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let mut cache = GlyphCache::new(CacheConfig {
            ttl: Duration::from_secs(10),
            capacity: 8,
        });
        let old = Instant::now() - Duration::from_secs(20);
        cache.insert_at(key('a', "s"), glyph('a'), old);
        cache.insert(key('b', "s"), glyph('b'));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
