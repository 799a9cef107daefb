//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use lettra_core::{OverlapMode, StyleOptions};

/// Overlap strategy argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    Table,
    Rules,
    Pixel,
}

impl From<ModeArg> for OverlapMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Table => OverlapMode::Table,
            ModeArg::Rules => OverlapMode::Rules,
            ModeArg::Pixel => OverlapMode::PixelCollision,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lettra")]
#[command(author, version, about = "Compose text from handwritten glyph assets", long_about = None)]
pub struct Cli {
    /// Text to compose
    pub text: String,

    /// Glyph asset manifest (JSON)
    #[arg(long, value_name = "PATH")]
    pub assets: PathBuf,

    /// Style name (overrides the preset's style)
    #[arg(long)]
    pub style: Option<String>,

    /// Precomputed overlap table (JSON)
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Overlap rules (JSON); built-in rules when omitted
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start from a built-in preset (classic, bold-script, compact)
    #[arg(long)]
    pub preset: Option<String>,

    /// Overlap strategy
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Render scale
    #[arg(long)]
    pub scale: Option<f32>,

    /// Character index to render with its alternate variant (repeatable)
    #[arg(long = "alternate", value_name = "INDEX")]
    pub alternates: Vec<usize>,

    /// Disable first/last positional variants
    #[arg(long)]
    pub no_positional: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `base`.
    pub fn style_options(&self, base: StyleOptions) -> StyleOptions {
        let mut options = base;
        if let Some(style) = &self.style {
            options.style = style.clone();
        }
        if let Some(mode) = self.mode {
            options.overlap_mode = mode.into();
        }
        if let Some(scale) = self.scale {
            options.scale = scale;
        }
        if self.no_positional {
            options.positional_variants = false;
        }
        options.alternates.extend(self.alternates.iter().copied());
        options
    }
}
