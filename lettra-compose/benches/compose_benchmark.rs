use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use lettra_compose::{Compositor, EngineConfig};
use lettra_core::{Snapshot, StyleOptions, Variant};
use lettra_layout::{OverlapRules, OverlapTable};
use lettra_text::{AssetRegistry, Scope};

const STROKE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200">
  <path d="M30 180 C50 20 150 20 170 180" fill="none" stroke="black" stroke-width="16"/>
</svg>"#;

fn compositor() -> Compositor {
    let mut assets = AssetRegistry::new();
    assets.add_style("classic", true);
    for c in 'a'..='z' {
        assets.insert("classic", c, Variant::Standard, STROKE_SVG);
    }
    let config = EngineConfig {
        preload: false,
        ..EngineConfig::default()
    };
    Compositor::from_config(
        Arc::new(assets),
        Arc::new(OverlapTable::new()),
        Arc::new(OverlapRules::builtin()),
        &config,
    )
}

fn snapshot(text: &str) -> Snapshot {
    Snapshot {
        text: text.to_owned(),
        options: StyleOptions::with_style("classic"),
        preset: None,
    }
}

/// Benchmark: compose with every glyph already cached
fn bench_compose_warm(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let compositor = compositor();
    let snap = snapshot("the quick brown fox");
    rt.block_on(compositor.compose(&snap)).unwrap();

    c.bench_function("compose_warm_19_chars", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(compositor.compose(black_box(&snap)).await.unwrap());
            });
        })
    });
}

/// Benchmark: compose after dropping the cache (every glyph profiled)
fn bench_compose_cold(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let compositor = compositor();
    let snap = snapshot("lettering");

    c.bench_function("compose_cold_9_chars", |b| {
        b.iter(|| {
            rt.block_on(async {
                compositor.clear_cache(Scope::All);
                black_box(compositor.compose(black_box(&snap)).await.unwrap());
            });
        })
    });
}

criterion_group!(benches, bench_compose_warm, bench_compose_cold);
criterion_main!(benches);
