//! # lettra-layout
//!
//! Places profiled glyphs next to each other.
//!
//! ```text
//! [Arc<Glyph>] ──► OverlapResolver ──► [ratio; n-1]
//!        │                                  │
//!        └──────────► LayoutComposer ◄──────┘
//!                           │
//!                           ▼
//!                      Composition
//! ```
//!
//! - **`overlap`**: Tiered overlap strategies: table, rules, pixel collision.
//! - **`engine`**: Advance recurrence and content box.
//! - **`bounds`**: Axis-aligned content box.

pub mod bounds;
pub mod engine;
pub mod overlap;

pub use bounds::Aabb;
pub use engine::{
    Composition, LayoutComposer, LayoutConfig, LayoutError, LayoutRequest, PositionedGlyph,
};
pub use overlap::{
    OverlapResolver, OverlapRule, OverlapRuleSet, OverlapRules, OverlapStrategy, OverlapTable,
    RuleError, TableError,
};
