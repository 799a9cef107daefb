//! Lettra CLI: composes text and prints the layout as JSON.
//!
//! Runs the full `lettra-text` → `lettra-layout` → `lettra-compose`
//! pipeline once. Set `RUST_LOG=debug` to follow glyph resolution.

mod cli;

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use cli::Cli;
use lettra_compose::{Compositor, CompositionReport, EngineConfig, Session};
use lettra_core::StyleOptions;
use lettra_layout::{OverlapRules, OverlapTable};
use lettra_text::AssetRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(e) = run(args).await {
        error!("{e}");
        return Err(e);
    }
    Ok(())
}

async fn run(args: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let assets = AssetRegistry::from_path(&args.assets)?;
    let table = match &args.table {
        Some(path) => OverlapTable::from_path(path)?,
        None => OverlapTable::new(),
    };
    let rules = match &args.rules {
        Some(path) => OverlapRules::from_path(path)?,
        None => OverlapRules::builtin(),
    };

    let compositor = Compositor::from_config(
        Arc::new(assets),
        Arc::new(table),
        Arc::new(rules),
        &config,
    );
    let mut session = Session::new(Arc::new(compositor));

    let base = match &args.preset {
        Some(id) => session
            .presets()
            .options(id)
            .ok_or_else(|| format!("unknown preset '{id}'"))?,
        None => StyleOptions::default(),
    };
    let options = args.style_options(base);

    info!(
        "Composing {:?} in style '{}' ({:?})",
        args.text, options.style, options.overlap_mode
    );

    let outcome = session
        .generate(args.text.clone(), options, args.preset.clone())
        .await?;

    let composition = outcome
        .composition()
        .ok_or("composition was superseded")?;
    let report = CompositionReport::from(composition.as_ref());

    let missing: String = report.placeholders().collect();
    if !missing.is_empty() {
        warn!("Rendered placeholders for: {missing:?}");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
