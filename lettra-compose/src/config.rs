//! Engine configuration.
//!
//! A single serde struct covering every tunable of the pipeline. Missing
//! fields take their defaults, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "cache_ttl_secs": 600, "batch_size": 8 }
//! ```

use std::path::Path;
use std::time::Duration;

use lettra_layout::LayoutConfig;
use lettra_text::{CacheConfig, ProfilerConfig, ServiceConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Pipeline scheduling knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Glyphs fetched concurrently before yielding.
    pub batch_size: usize,
    /// Pause between batches; zero means a plain yield.
    pub batch_pause: Duration,
    /// Warm the cache for likely next characters after each composition.
    pub preload: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        EngineConfig::default().pipeline_config()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Working raster resolution (default: 200)
    pub resolution: u32,
    /// Resolution used for preloading (default: 100)
    pub preload_resolution: u32,
    /// Sampling stride; `None` picks 2 above 100px, else 1
    pub stride: Option<u32>,
    /// Alpha above which a pixel counts as ink (default: 10)
    pub alpha_threshold: u8,
    /// Advance of whitespace, canonical units (default: 60)
    pub space_width: f32,
    /// Glyph cache TTL in seconds (default: 1800)
    pub cache_ttl_secs: u64,
    /// Glyph cache capacity (default: 512)
    pub cache_capacity: usize,
    /// Glyphs per fetch batch (default: 5)
    pub batch_size: usize,
    /// Pause between batches in ms (default: 0, plain yield)
    pub batch_pause_ms: u64,
    /// Preload likely next characters (default: true)
    pub preload: bool,
    /// Content width that `base_scale` fits into (default: 1000)
    pub target_width: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolution: lettra_text::raster::DEFAULT_RESOLUTION,
            preload_resolution: lettra_text::raster::PRELOAD_RESOLUTION,
            stride: None,
            alpha_threshold: lettra_text::raster::DEFAULT_ALPHA_THRESHOLD,
            space_width: lettra_text::service::DEFAULT_SPACE_WIDTH,
            cache_ttl_secs: lettra_text::cache::DEFAULT_TTL.as_secs(),
            cache_capacity: lettra_text::cache::DEFAULT_CAPACITY,
            batch_size: 5,
            batch_pause_ms: 0,
            preload: true,
            target_width: lettra_layout::engine::DEFAULT_TARGET_WIDTH,
        }
    }
}

impl EngineConfig {
    /// Create config for testing (small cache, short TTL, no preloading).
    pub fn for_testing() -> Self {
        Self {
            cache_ttl_secs: 60,
            cache_capacity: 64,
            batch_size: 2,
            preload: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };
        if self.resolution == 0 {
            return invalid("resolution", "must be positive");
        }
        if self.preload_resolution == 0 {
            return invalid("preload_resolution", "must be positive");
        }
        if self.stride == Some(0) {
            return invalid("stride", "must be positive");
        }
        if self.batch_size == 0 {
            return invalid("batch_size", "must be positive");
        }
        if self.cache_capacity == 0 {
            return invalid("cache_capacity", "must be positive");
        }
        if !(self.space_width.is_finite() && self.space_width >= 0.0) {
            return invalid("space_width", "must be a non-negative number");
        }
        if !(self.target_width.is_finite() && self.target_width > 0.0) {
            return invalid("target_width", "must be a positive number");
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Per-component views
    // ---------------------------------------------------------------

    pub fn profiler_config(&self) -> ProfilerConfig {
        ProfilerConfig {
            resolution: self.resolution,
            stride: self.stride,
            alpha_threshold: self.alpha_threshold,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            capacity: self.cache_capacity,
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            preload_resolution: self.preload_resolution,
            space_width: self.space_width,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            batch_size: self.batch_size.max(1),
            batch_pause: Duration::from_millis(self.batch_pause_ms),
            preload: self.preload,
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            target_width: self.target_width,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
