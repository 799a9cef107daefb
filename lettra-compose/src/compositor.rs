//! Compositor: snapshot in, published composition out.
//!
//! ```text
//! compose(snapshot)
//!   │ generation = ++counter
//!   │ style changed? ── clear cache for the previous style
//!   ▼
//! batches of N chars ── join_all(service.glyph) ── yield ── …
//!   │ failures → placeholder glyphs
//!   ▼
//! OverlapResolver (mode) ──► LayoutComposer
//!   │
//!   ▼
//! still the newest generation? ── no ──► Superseded
//!   │ yes
//!   ▼
//! watch::Sender ──► subscribers        preload likely next chars
//! ```
//!
//! Compositions may overlap in time. Only the one started last is ever
//! published; older ones notice at the next batch boundary or at
//! publication and report [`ComposeOutcome::Superseded`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::join_all;
use lettra_core::{Glyph, Snapshot, StyleOptions};
use lettra_layout::{
    Composition, LayoutComposer, LayoutError, LayoutRequest, OverlapResolver, OverlapRules,
    OverlapTable,
};
use lettra_text::{
    AssetResolver, AssetSource, GlyphCache, GlyphError, GlyphService, RasterProfiler, Scope,
};
use tokio::sync::watch;

use crate::config::{EngineConfig, PipelineConfig};

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Result of one [`Compositor::compose`] call.
#[derive(Clone, Debug)]
pub enum ComposeOutcome {
    /// Newest composition; it has been published.
    Completed(Arc<Composition>),
    /// A later call started before this one finished. Nothing was published.
    Superseded { generation: u64 },
}

impl ComposeOutcome {
    pub fn composition(&self) -> Option<&Arc<Composition>> {
        match self {
            Self::Completed(c) => Some(c),
            Self::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

type Published = Option<Arc<Composition>>;

pub struct Compositor {
    service: GlyphService,
    table: Arc<OverlapTable>,
    rules: Arc<OverlapRules>,
    composer: LayoutComposer,
    pipeline: PipelineConfig,
    generation: AtomicU64,
    active_style: Mutex<Option<String>>,
    published: watch::Sender<Published>,
}

impl Compositor {
    pub fn new(
        service: GlyphService,
        table: Arc<OverlapTable>,
        rules: Arc<OverlapRules>,
        config: &EngineConfig,
    ) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            service,
            table,
            rules,
            composer: LayoutComposer::new(config.layout_config()),
            pipeline: config.pipeline_config(),
            generation: AtomicU64::new(0),
            active_style: Mutex::new(None),
            published,
        }
    }

    /// Build the whole pipeline, glyph service included, from one config.
    pub fn from_config(
        assets: Arc<dyn AssetSource>,
        table: Arc<OverlapTable>,
        rules: Arc<OverlapRules>,
        config: &EngineConfig,
    ) -> Self {
        let service = GlyphService::new(
            AssetResolver::new(assets),
            RasterProfiler::new(config.profiler_config()),
            GlyphCache::new(config.cache_config()),
            config.service_config(),
        );
        Self::new(service, table, rules, config)
    }

    pub fn service(&self) -> &GlyphService {
        &self.service
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Receiver of every published composition.
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.published.subscribe()
    }

    /// Most recently published composition.
    pub fn latest(&self) -> Published {
        self.published.borrow().clone()
    }

    /// Drop cached glyphs in `scope`.
    pub fn clear_cache(&self, scope: Scope) -> usize {
        self.service.clear(scope)
    }

    /// Compose `snapshot` and publish it unless a newer call superseded it.
    pub async fn compose(&self, snapshot: &Snapshot) -> Result<ComposeOutcome, ComposeError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let options = &snapshot.options;
        self.switch_style(&options.style);

        let chars: Vec<char> = snapshot.text.chars().collect();
        let Some(glyphs) = self.fetch_glyphs(generation, &chars, options).await else {
            log::debug!("Composition #{generation} superseded while fetching glyphs");
            return Ok(ComposeOutcome::Superseded { generation });
        };

        let resolver = OverlapResolver::new(
            Arc::clone(&self.table),
            Arc::clone(&self.rules),
            options.overlap_mode,
        );
        let overlaps = resolver.resolve_all(&options.style, &glyphs);
        let composition = Arc::new(self.composer.compose(LayoutRequest {
            text: &snapshot.text,
            style: &options.style,
            glyphs: &glyphs,
            overlaps: &overlaps,
            scale: options.effective_scale(),
        })?);

        if !self.publish(generation, &composition) {
            log::debug!("Composition #{generation} superseded, not published");
            return Ok(ComposeOutcome::Superseded { generation });
        }

        if self.pipeline.preload {
            if let Some(&last) = chars.last() {
                let next = options.flags_at(chars.len(), chars.len() + 1);
                self.service.preload_likely_next(last, &options.style, next);
            }
        }
        Ok(ComposeOutcome::Completed(composition))
    }

    // ---------------------------------------------------------------
    // Internal helpers
    // ---------------------------------------------------------------

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Publish if `generation` is still the newest. The check runs under
    /// the channel's lock, so a stale result can never overwrite a newer one.
    fn publish(&self, generation: u64, composition: &Arc<Composition>) -> bool {
        self.published.send_if_modified(|slot| {
            if !self.is_current(generation) {
                return false;
            }
            *slot = Some(Arc::clone(composition));
            true
        })
    }

    fn switch_style(&self, style: &str) {
        let previous = self
            .active_style
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(style.to_owned());

        if let Some(previous) = previous.filter(|p| p != style) {
            let dropped = self.service.clear(Scope::Style(previous.clone()));
            log::info!("Style changed '{previous}' → '{style}': dropped {dropped} cached glyphs");
        }
    }

    /// Resolve every character, batch by batch. `None` once superseded.
    async fn fetch_glyphs(
        &self,
        generation: u64,
        chars: &[char],
        options: &StyleOptions,
    ) -> Option<Vec<Arc<Glyph>>> {
        let len = chars.len();
        let batch_size = self.pipeline.batch_size.max(1);
        let mut glyphs = Vec::with_capacity(len);

        for (batch_index, batch) in chars.chunks(batch_size).enumerate() {
            if batch_index > 0 {
                self.pause().await;
                if !self.is_current(generation) {
                    return None;
                }
            }

            let offset = batch_index * batch_size;
            let fetches = batch.iter().enumerate().map(|(j, &c)| {
                self.service
                    .glyph(c, &options.style, options.flags_at(offset + j, len))
            });

            for (result, &c) in join_all(fetches).await.into_iter().zip(batch) {
                glyphs.push(result.unwrap_or_else(|e| substitute(c, &e)));
            }
        }
        Some(glyphs)
    }

    async fn pause(&self) {
        if self.pipeline.batch_pause.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.pipeline.batch_pause).await;
        }
    }
}

fn substitute(character: char, err: &GlyphError) -> Arc<Glyph> {
    if err.is_recoverable() {
        log::warn!("Using placeholder for '{character}': {err}");
    } else {
        log::error!("Using placeholder for '{character}': {err}");
    }
    Arc::new(Glyph::placeholder(character))
}

// ===================================================================
// Tests
// ===================================================================
