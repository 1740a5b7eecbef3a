//! Benchmarks for the Alsvid compilation pipeline
//!
//! Run with: cargo bench -p alsvid-compile

use alsvid_compile::{CompileConfig, Compiler, LayoutMode, Router, RoutingStrategy, StageScheduler};
use alsvid_ir::{ArrayModel, InteractionGraph, Placement};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A brickwork circuit: alternating even/odd nearest-neighbour layers.
fn brickwork(num_qubits: u32, layers: u32) -> InteractionGraph {
    let mut pairs = Vec::new();
    for layer in 0..layers {
        let start = layer % 2;
        let mut q = start;
        while q + 1 < num_qubits {
            pairs.push((q, q + 1));
            q += 2;
        }
    }
    InteractionGraph::from_pairs(num_qubits, &pairs).unwrap()
}

/// A random injective placement of `n` qubits on the array.
fn random_placement(n: u32, array: &ArrayModel, seed: u64) -> Placement {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<u32> = (0..array.num_sites()).collect();
    positions.shuffle(&mut rng);
    Placement::new(
        positions
            .iter()
            .take(n as usize)
            .map(|&p| array.site_at(p))
            .collect(),
    )
}

/// Benchmark stage scheduling
fn bench_scheduling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduling");

    for num_qubits in &[10, 20, 50, 100] {
        let graph = brickwork(*num_qubits, 8);
        group.bench_with_input(
            BenchmarkId::new("brickwork", num_qubits),
            &graph,
            |b, graph| {
                b.iter(|| StageScheduler::new(black_box(graph)).schedule().unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark routing between random placements
fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");

    let array = ArrayModel::new(16, 16, 2.0);
    for num_qubits in &[16, 64, 128] {
        let from = random_placement(*num_qubits, &array, 1);
        let to = random_placement(*num_qubits, &array, 2);

        for (label, strategy) in [
            ("maximalis", RoutingStrategy::Maximalis),
            ("sorting", RoutingStrategy::SortingHeuristic),
        ] {
            let config = CompileConfig {
                routing_strategy: strategy,
                ..CompileConfig::default()
            };
            group.bench_with_input(
                BenchmarkId::new(label, num_qubits),
                &config,
                |b, config| {
                    b.iter(|| {
                        Router::new(config, array)
                            .route(black_box(&from), black_box(&to), 1)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the full pipeline in both layout modes
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.sample_size(10);

    for num_qubits in &[10, 20] {
        let graph = brickwork(*num_qubits, 4);
        let array = ArrayModel::new(16, 16, 24.0);

        group.bench_with_input(
            BenchmarkId::new("trivial", num_qubits),
            &graph,
            |b, graph| {
                let config = CompileConfig {
                    layout_mode: LayoutMode::Trivial,
                    ..CompileConfig::default()
                };
                let compiler = Compiler::new(config);
                b.iter(|| compiler.compile(black_box(graph), array, "bench").unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("dynamic", num_qubits),
            &graph,
            |b, graph| {
                let config = CompileConfig {
                    anneal_iterations: 2_000,
                    ..CompileConfig::default()
                };
                let compiler = Compiler::new(config);
                b.iter(|| compiler.compile(black_box(graph), array, "bench").unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scheduling, bench_routing, bench_compile);

criterion_main!(benches);
