//! Async façade over resolver, profiler and cache.
//!
//! ```text
//! glyph(c, style, flags)
//!     │ whitespace ─────────────────────────► space glyph
//!     │ cache hit ──────────────────────────► Arc<Glyph>
//!     ▼
//! in-flight map ── existing job? ── join it (coalesced)
//!     │ no
//!     ▼
//! spawn_blocking(resolve + rasterize) ──► cache.insert ──► Arc<Glyph>
//! ```
//!
//! Rasterization never runs on the async executor. Concurrent requests
//! for the same cache key share one job through a `Shared` future, so a
//! glyph is never profiled twice at the same time. Preloads go through
//! the same registry at a reduced resolution and are fire-and-forget.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use lettra_core::{Glyph, VariantFlags};

use crate::assets::{AssetError, AssetResolver};
use crate::bigrams::likely_next;
use crate::cache::{CacheKey, CacheStats, GlyphCache, Scope};
use crate::raster::{RasterError, RasterProfiler, PRELOAD_RESOLUTION};

/// Default advance of a whitespace glyph, in canonical units.
pub const DEFAULT_SPACE_WIDTH: f32 = 60.0;

// ── Errors ──────────────────────────────────────────────────────────

/// Per-character failure. `Clone` so it can flow through shared jobs.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GlyphError {
    #[error("No asset for '{character}' in style '{style}'")]
    AssetMissing { character: char, style: String },

    #[error("Cannot rasterize '{character}': {source}")]
    ParseFailure {
        character: char,
        #[source]
        source: RasterError,
    },

    #[error("Glyph job for '{character}' did not complete: {reason}")]
    Task { character: char, reason: String },
}

impl GlyphError {
    fn from_asset(character: char, style: &str, err: AssetError) -> Self {
        match err {
            AssetError::Missing { style, .. } | AssetError::UnknownStyle(style) => {
                Self::AssetMissing { character, style }
            }
            other => Self::Task {
                character,
                reason: format!("asset source failed for style '{style}': {other}"),
            },
        }
    }

    /// Asset or markup problems, as opposed to a failed background job.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AssetMissing { .. } | Self::ParseFailure { .. })
    }

    pub fn character(&self) -> char {
        match self {
            Self::AssetMissing { character, .. }
            | Self::ParseFailure { character, .. }
            | Self::Task { character, .. } => *character,
        }
    }
}

// ── Configuration / stats ───────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub struct ServiceConfig {
    /// Resolution used by [`GlyphService::preload`].
    pub preload_resolution: u32,
    /// Advance of whitespace glyphs.
    pub space_width: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            preload_resolution: PRELOAD_RESOLUTION,
            space_width: DEFAULT_SPACE_WIDTH,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Glyphs rasterized and profiled.
    pub profiled: u64,
    /// Requests that joined an already running job.
    pub coalesced: u64,
    /// Preloads that failed (and were ignored).
    pub preload_failures: u64,
    pub cache: CacheStats,
}

#[derive(Default)]
struct Counters {
    profiled: AtomicU64,
    coalesced: AtomicU64,
    preload_failures: AtomicU64,
}

type GlyphResult = Result<Arc<Glyph>, GlyphError>;
type SharedJob = Shared<BoxFuture<'static, GlyphResult>>;

// ── Service ─────────────────────────────────────────────────────────

struct Inner {
    resolver: AssetResolver,
    profiler: RasterProfiler,
    cache: Mutex<GlyphCache>,
    inflight: Mutex<HashMap<CacheKey, SharedJob>>,
    config: ServiceConfig,
    counters: Counters,
}

/// Cheaply clonable handle; clones share cache and in-flight registry.
#[derive(Clone)]
pub struct GlyphService {
    inner: Arc<Inner>,
}

impl GlyphService {
    pub fn new(
        resolver: AssetResolver,
        profiler: RasterProfiler,
        cache: GlyphCache,
        config: ServiceConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                resolver,
                profiler,
                cache: Mutex::new(cache),
                inflight: Mutex::new(HashMap::new()),
                config,
                counters: Counters::default(),
            }),
        }
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.inner.resolver
    }

    /// Resolve and profile a glyph at the profiler's working resolution.
    pub async fn glyph(&self, character: char, style: &str, flags: VariantFlags) -> GlyphResult {
        if character.is_whitespace() {
            return Ok(Arc::new(Glyph::space(character, self.inner.config.space_width)));
        }

        let key = CacheKey::new(character, flags, style);
        let cached = self.lock_cache().get(&key);
        if let Some(glyph) = cached {
            return Ok(glyph);
        }

        let resolution = self.inner.profiler.config().resolution;
        self.job(key, character, resolution).await
    }

    /// Warm the cache for a glyph without waiting for it.
    ///
    /// Runs at the reduced preload resolution. Failures are logged and
    /// counted, never reported. Outside a tokio runtime this is a no-op.
    pub fn preload(&self, character: char, style: &str, flags: VariantFlags) {
        if character.is_whitespace() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::debug!("Preload of '{character}' skipped: no runtime");
            return;
        };

        let key = CacheKey::new(character, flags, style);
        let cached = self.lock_cache().contains(&key);
        if cached || self.lock_inflight().contains_key(&key) {
            return;
        }

        let job = self.job(key, character, self.inner.config.preload_resolution);
        let service = self.clone();
        handle.spawn(async move {
            if let Err(e) = job.await {
                service.inner.counters.preload_failures.fetch_add(1, Ordering::Relaxed);
                log::debug!("Preload failed: {e}");
            }
        });
    }

    /// Preload the characters most likely to be typed after `previous`.
    ///
    /// `flags` are the flags the next character will be requested with,
    /// so the warmed entries share its cache key.
    pub fn preload_likely_next(&self, previous: char, style: &str, flags: VariantFlags) {
        for &next in likely_next(previous) {
            self.preload(next, style, flags);
        }
    }

    /// Remove cached glyphs in `scope`.
    pub fn clear(&self, scope: Scope) -> usize {
        self.lock_cache().clear(scope)
    }

    /// Drop expired cache entries.
    pub fn purge_expired(&self) -> usize {
        self.lock_cache().purge_expired()
    }

    pub fn is_cached(&self, character: char, style: &str, flags: VariantFlags) -> bool {
        self.lock_cache().contains(&CacheKey::new(character, flags, style))
    }

    pub fn stats(&self) -> ServiceStats {
        let counters = &self.inner.counters;
        ServiceStats {
            profiled: counters.profiled.load(Ordering::Relaxed),
            coalesced: counters.coalesced.load(Ordering::Relaxed),
            preload_failures: counters.preload_failures.load(Ordering::Relaxed),
            cache: self.lock_cache().stats(),
        }
    }

    // ---------------------------------------------------------------
    // Internal helpers
    // ---------------------------------------------------------------

    /// Join the running job for `key`, or register a new one.
    fn job(&self, key: CacheKey, character: char, resolution: u32) -> SharedJob {
        let mut inflight = self.lock_inflight();
        if let Some(job) = inflight.get(&key) {
            self.inner.counters.coalesced.fetch_add(1, Ordering::Relaxed);
            return job.clone();
        }

        // A job may have finished between the caller's cache miss and now.
        if let Some(glyph) = self.lock_cache().get(&key) {
            return futures_util::future::ready(Ok(glyph)).boxed().shared();
        }

        let job = self
            .clone()
            .run_job(key.clone(), character, resolution)
            .boxed()
            .shared();
        inflight.insert(key, job.clone());
        job
    }

    async fn run_job(self, key: CacheKey, character: char, resolution: u32) -> GlyphResult {
        let result = self.profile_blocking(&key, character, resolution).await;

        if let Ok(glyph) = &result {
            self.lock_cache().insert(key.clone(), Arc::clone(glyph));
        }
        self.lock_inflight().remove(&key);
        result
    }

    async fn profile_blocking(&self, key: &CacheKey, character: char, resolution: u32) -> GlyphResult {
        let resolver = self.inner.resolver.clone();
        let profiler = self.inner.profiler.clone();
        let style = key.style.clone();
        let flags = key.flags;

        let joined = tokio::task::spawn_blocking(move || {
            let asset = resolver
                .resolve(character, &style, flags)
                .map_err(|e| GlyphError::from_asset(character, &style, e))?;
            profiler
                .glyph(&asset, resolution)
                .map_err(|source| GlyphError::ParseFailure { character, source })
        })
        .await;

        match joined {
            Ok(Ok(glyph)) => {
                self.inner.counters.profiled.fetch_add(1, Ordering::Relaxed);
                log::trace!("Profiled '{character}' at {resolution}px");
                Ok(Arc::new(glyph))
            }
            Ok(Err(e)) => Err(e),
            Err(e) => Err(GlyphError::Task {
                character,
                reason: e.to_string(),
            }),
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, GlyphCache> {
        self.inner.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<CacheKey, SharedJob>> {
        self.inner.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ===================================================================
// Tests
// ===================================================================
