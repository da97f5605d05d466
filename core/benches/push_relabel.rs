//! Maximum flow benchmarks on layered random networks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use graphflow::{EdmondsKarpSolver, Graph, MaximumFlowAlgorithm, NodeId, PushRelabelSolver};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source, `layers` layers of `width` vertices, sink; random arcs between consecutive layers
fn layered_network(layers: usize, width: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::with_nodes(true, layers * width + 2);
    let source = NodeId(0);
    let sink = NodeId(layers * width + 1);
    let vertex = |layer: usize, i: usize| NodeId(1 + layer * width + i);

    for i in 0..width {
        graph.add_edge(source, vertex(0, i), rng.gen_range(1.0..100.0)).unwrap();
        graph.add_edge(vertex(layers - 1, i), sink, rng.gen_range(1.0..100.0)).unwrap();
    }
    for layer in 0..layers - 1 {
        for i in 0..width {
            for j in 0..width {
                if rng.gen_bool(0.3) {
                    graph
                        .add_edge(vertex(layer, i), vertex(layer + 1, j), rng.gen_range(1.0..50.0))
                        .unwrap();
                }
            }
        }
    }
    graph
}

fn benchmark_push_relabel(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_relabel");

    for width in [8, 16, 32] {
        let graph = layered_network(8, width, 7);
        let sink = NodeId(graph.node_count() - 1);

        group.bench_with_input(BenchmarkId::from_parameter(width), &graph, |b, graph| {
            b.iter(|| {
                let mut solver = PushRelabelSolver::new(graph).unwrap();
                black_box(solver.maximum_flow_value(NodeId(0), sink).unwrap())
            })
        });
    }

    group.finish();
}

fn benchmark_against_edmonds_karp(c: &mut Criterion) {
    let graph = layered_network(6, 16, 11);
    let sink = NodeId(graph.node_count() - 1);

    let mut group = c.benchmark_group("solver_comparison");

    group.bench_function("push_relabel", |b| {
        b.iter(|| {
            let mut solver = PushRelabelSolver::new(&graph).unwrap();
            black_box(solver.maximum_flow(NodeId(0), sink).unwrap())
        })
    });

    group.bench_function("edmonds_karp", |b| {
        b.iter(|| {
            let mut solver = EdmondsKarpSolver::new(&graph).unwrap();
            black_box(solver.maximum_flow(NodeId(0), sink).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_push_relabel, benchmark_against_edmonds_karp);
criterion_main!(benches);
