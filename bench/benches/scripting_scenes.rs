//! Scene benchmarks using Criterion.
//!
//! These benchmarks measure whole-scene workloads:
//! - Parsing generated JSON scenes into game objects
//! - Running frames of a loaded scene

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rusty_bench::scene::{SceneConfig, load_scene, scene_json};
use rusty_scripting::gameplay::{GameState, GameTime};

const CONFIGS: [(&str, usize); 3] = [("small", 10), ("medium", 100), ("large", 500)];

// =============================================================================
// Parse Benchmarks
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/parse");

    for (label, objects) in CONFIGS {
        let config = SceneConfig {
            objects,
            ..Default::default()
        };
        let text = scene_json(&config);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("load_str", label), &text, |b, text| {
            let mut state = load_scene(&SceneConfig {
                objects: 0,
                ..Default::default()
            })
            .unwrap();
            b.iter(|| state.load_str(text).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// Frame Benchmarks
// =============================================================================

fn run_frame(state: &mut GameState, time: &mut GameTime) {
    time.advance(Duration::from_millis(16));
    state.update(time).unwrap();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/frame");

    for (label, objects) in CONFIGS {
        let config = SceneConfig {
            objects,
            ..Default::default()
        };
        group.throughput(Throughput::Elements(objects as u64));

        group.bench_function(BenchmarkId::new("update", label), |b| {
            let mut state = load_scene(&config).unwrap();
            let mut time = GameTime::default();
            b.iter(|| run_frame(&mut state, &mut time));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_parse, bench_frames);

criterion_main!(benches);
