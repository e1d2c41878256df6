use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use graph_components::{GraphConfig, MutableGraph, ReadGraph};

fn make_line_graph(size: usize, components: bool) -> MutableGraph {
    let config = GraphConfig::default()
        .with_node_capacity(size)
        .with_edge_capacity(size)
        .with_component_management(components);
    let mut graph = MutableGraph::with_config(config);

    graph.perform_transaction(|graph| {
        let mut prev_node = graph.add_node();
        for _ in 1..size {
            let node = graph.add_node();
            graph.add_edge(prev_node, node);
            prev_node = node;
        }
    });

    graph
}

fn bench_make_graph(c: &mut Criterion) {
    let mut g = c.benchmark_group("graph creation");

    for size in [0, 100, 10_000, 100_000] {
        g.bench_with_input(
            BenchmarkId::new("make_line_graph", size),
            &size,
            |b, size| b.iter(|| black_box(make_line_graph(*size, false))),
        );
        g.bench_with_input(
            BenchmarkId::new("make_managed_line_graph", size),
            &size,
            |b, size| b.iter(|| black_box(make_line_graph(*size, true))),
        );
    }
}

fn bench_split_and_merge(c: &mut Criterion) {
    let mut g = c.benchmark_group("component updates");

    for size in [100, 10_000, 100_000] {
        g.bench_with_input(
            BenchmarkId::new("cut_and_rejoin_line", size),
            &size,
            |b, size| {
                let mut graph = make_line_graph(*size, true);
                b.iter(|| {
                    let middle = graph.edge_ids().nth(*size / 2).unwrap();
                    let edge = graph.edge_by_id(middle).copied().unwrap();
                    graph.remove_edge(middle);
                    graph.add_edge(edge.source_id(), edge.target_id());
                    black_box(graph.num_components())
                })
            },
        );
    }
}

fn bench_snapshot(c: &mut Criterion) {
    let mut g = c.benchmark_group("graph snapshots");

    for size in [0, 100, 10_000] {
        g.bench_with_input(
            BenchmarkId::new("snapshot_line_graph", size),
            &size,
            |b, size| {
                let graph = make_line_graph(*size, true);
                b.iter(|| black_box(graph.snapshot()))
            },
        );
    }
}

criterion_group!(benches, bench_make_graph, bench_split_and_merge, bench_snapshot);
criterion_main!(benches);
