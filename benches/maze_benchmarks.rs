use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use maze_gen::{
    grid::{Direction, Size},
    maze::Backtracker,
    render::Recorder,
    scheduler::{GenerationConfig, Policy, Scheduler},
    tile::{classify, Walls},
};

// Fixed seed for deterministic benchmarks
const BENCHMARK_SEED: u64 = 12345;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for size in [10, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let (maze, placements) =
                    Backtracker::generate(Size::new(size, size), BENCHMARK_SEED).unwrap();
                black_box((maze.placed(), placements.len()))
            })
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let layouts: Vec<Walls> = (0..16u8)
        .map(|bits| {
            let mut walls = Walls::default();
            for (index, direction) in Direction::ALL.into_iter().enumerate() {
                walls[direction] = bits & (1 << index) != 0;
            }
            walls
        })
        .collect();

    c.bench_function("classify_all_layouts", |b| {
        b.iter(|| {
            for walls in &layouts {
                black_box(classify(black_box(walls)));
            }
        })
    });
}

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");
    group.sample_size(20);

    for policy in [Policy::Immediate, Policy::Budgeted] {
        group.bench_function(format!("{:?}", policy), |b| {
            b.iter(|| {
                let mut scheduler = Scheduler::new(Recorder::new(), ())
                    .with_frame_interval(Duration::ZERO);
                let config = GenerationConfig::new(Size::new(50, 50))
                    .with_policy(policy)
                    .with_seed(BENCHMARK_SEED);

                scheduler.request_generation(&config).unwrap();
                black_box(scheduler.run())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_classify, bench_schedule);
criterion_main!(benches);
