//! # lettra-compose: composition pipeline for Lettra
//!
//! Wires the glyph service, overlap resolution and layout into a single
//! async call, and pairs it with the undo/redo history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  snapshot   ┌──────────────┐   glyphs   ┌──────────────┐
//! │  Session    │ ──────────► │  Compositor  │ ◄────────► │ GlyphService │
//! │ (+ history) │             │ (generation) │            │ (cache)      │
//! └─────────────┘             └──────┬───────┘            └──────────────┘
//!                                    │ overlaps + layout
//!                                    ▼
//!                             watch::Sender<Composition>
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `EngineConfig`, JSON-loadable
//! - [`compositor`]: Batched, last-write-wins composition
//! - [`session`]: History glue: generate, undo, redo, replay
//! - [`report`]: Serializable composition summary

pub mod compositor;
pub mod config;
pub mod report;
pub mod session;

// Re-exports for convenience
pub use compositor::{ComposeError, ComposeOutcome, Compositor};
pub use config::{ConfigError, EngineConfig, PipelineConfig};
pub use report::{CompositionReport, GlyphReport};
pub use session::Session;
