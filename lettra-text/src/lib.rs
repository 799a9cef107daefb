//! # lettra-text
//!
//! Glyph pipeline for the Lettra composition engine. Turns a character in
//! a handwriting style into a profiled [`Glyph`](lettra_core::Glyph):
//! vector markup is resolved, rasterized with `resvg`, and reduced to
//! ink bounds and per-column ink profiles.
//!
//! ## Architecture
//!
//! ```text
//! AssetSource (manifest / in-memory)
//!     │
//!     ▼
//! AssetResolver ── (char, style, flags) ──► ResolvedAsset
//!     │
//!     ▼
//! RasterProfiler ── alpha plane ──► bounds + ColumnProfiles
//!     │
//!     ▼
//! GlyphService ◄──► GlyphCache (TTL + LRU)
//! ```
//!
//! - **`assets`**: Asset manifest, variant selection.
//! - **`raster`**: Rasterization and ink profiling.
//! - **`cache`**: Time-bounded glyph cache.
//! - **`service`**: Async façade: coalescing, blocking offload, preloading.

pub mod assets;
pub mod bigrams;
pub mod cache;
pub mod raster;
pub mod service;

// Re-exports for ergonomic use.
pub use assets::{AssetError, AssetRegistry, AssetResolver, AssetSource, ResolvedAsset};
pub use cache::{CacheConfig, CacheKey, CacheStats, GlyphCache, Scope};
pub use raster::{ProfilerConfig, RasterError, RasterProfile, RasterProfiler};
pub use service::{GlyphError, GlyphService, ServiceConfig, ServiceStats};
