//! Benchmarks for position generation and per-frame updates.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use treemorph::instance::InstanceBuffer;
use treemorph::{
    fixed_frames, generate_positions_with, FrameTime, Mode, OrnamentConfig, OrnamentGroup, Scene,
    SceneConfig, TreeShape,
};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_positions");
    let shape = TreeShape::new(12.0, 5.0);

    for count in [150, 3500, 20_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(1);
            b.iter(|| black_box(generate_positions_with(&mut rng, count, 15.0, &shape)))
        });
    }

    group.finish();
}

fn bench_ornament_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("ornament_update");

    for count in [40, 400, 4000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let config = OrnamentConfig {
                count,
                ..OrnamentConfig::lights()
            };
            let mut ornaments = OrnamentGroup::new(config, &mut SmallRng::seed_from_u64(2));
            let mut buffer = InstanceBuffer::new(count);
            let frame = FrameTime::new(1.0, 0.016);
            b.iter(|| ornaments.update(black_box(Mode::Formed), frame, &mut buffer))
        });
    }

    group.finish();
}

fn bench_scene_update(c: &mut Criterion) {
    c.bench_function("scene_update_default", |b| {
        let mut scene = Scene::new(SceneConfig {
            seed: Some(3),
            ..Default::default()
        })
        .unwrap();
        scene.toggle();
        let mut frames = fixed_frames(0.016);
        b.iter(|| {
            if let Some(frame) = frames.next() {
                black_box(scene.update(frame));
            }
        })
    });
}

criterion_group!(benches, bench_generate, bench_ornament_update, bench_scene_update);
criterion_main!(benches);
