//! End-to-end maximum flow tests against the public API
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashSet;

use graphflow::validation::{verify_cut_duality, verify_maximum_flow};
use graphflow::{
    Algorithm, DistanceLabel, EdgeId, EdmondsKarpSolver, Flow, FlowConfig, FlowDiagnostics, FlowError, FlowGraph,
    FlowMetrics, Graph, MaximumFlowAlgorithm, NodeId, PushRelabelSolver, DEFAULT_EPSILON,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOLERANCE: f64 = 1e-6;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_graph(directed: bool, n: usize, edges: &[(usize, usize, f64)]) -> Graph {
    let mut graph = Graph::with_nodes(directed, n);
    for &(u, v, w) in edges {
        graph.add_edge(NodeId(u), NodeId(v), w).unwrap();
    }
    graph
}

/// Random graph without parallel edges and with integer capacities
fn random_graph(rng: &mut StdRng, directed: bool, n: usize, density: f64) -> Graph {
    random_graph_with(rng, directed, n, density, |rng| f64::from(rng.gen_range(0u32..=10)))
}

/// Random graph without parallel edges, capacities drawn by `capacity`
fn random_graph_with<F>(rng: &mut StdRng, directed: bool, n: usize, density: f64, mut capacity: F) -> Graph
where
    F: FnMut(&mut StdRng) -> f64,
{
    let mut graph = Graph::with_nodes(directed, n);
    let mut pairs = HashSet::new();
    for u in 0..n {
        for v in 0..n {
            if u == v || !rng.gen_bool(density) {
                continue;
            }
            let key = if directed { (u, v) } else { (u.min(v), u.max(v)) };
            if pairs.insert(key) {
                let weight = capacity(rng);
                graph.add_edge(NodeId(u), NodeId(v), weight).unwrap();
            }
        }
    }
    graph
}

#[test]
fn scenario_two_paths_with_cross_edge() {
    init_logging();
    // s=0, a=1, b=2, t=3; every s-t cut has capacity 5
    let graph = build_graph(true, 4, &[(0, 1, 3.0), (0, 2, 2.0), (1, 2, 1.0), (1, 3, 2.0), (2, 3, 3.0)]);

    let mut solver = PushRelabelSolver::new(&graph).unwrap();
    let flow = solver.maximum_flow(NodeId(0), NodeId(3)).unwrap();
    assert!((flow.value - 5.0).abs() < TOLERANCE);

    let reference = EdmondsKarpSolver::new(&graph)
        .unwrap()
        .maximum_flow_value(NodeId(0), NodeId(3))
        .unwrap();
    assert!((flow.value - reference).abs() < TOLERANCE);

    let report = verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).unwrap();
    assert!((report.source_outflow - 5.0).abs() < TOLERANCE);
    assert!((flow.edge_flow(EdgeId(0)) - 3.0).abs() < TOLERANCE);
    assert!((flow.edge_flow(EdgeId(1)) - 2.0).abs() < TOLERANCE);
}

#[test]
fn scenario_single_saturated_edge() {
    let graph = build_graph(true, 2, &[(0, 1, 5.0)]);
    let mut metrics = FlowMetrics::new();
    let flow = {
        let mut solver = PushRelabelSolver::new(&graph).unwrap().with_diagnostics(&mut metrics);
        let flow = solver.maximum_flow(NodeId(0), NodeId(1)).unwrap();
        assert!(!solver.entered_flow_back());
        flow
    };

    assert_eq!(flow.value, 5.0);
    assert_eq!(flow.edge_flow(EdgeId(0)), 5.0);
    assert_eq!(metrics.push_operations, 1);
    assert_eq!(metrics.relabel_operations, 0);
}

#[test]
fn scenario_disconnected_terminals() {
    let graph = build_graph(true, 4, &[(0, 1, 4.0), (2, 3, 6.0)]);
    let mut solver = PushRelabelSolver::new(&graph).unwrap();
    let flow = solver.maximum_flow(NodeId(0), NodeId(3)).unwrap();

    assert_eq!(flow.value, 0.0);
    assert!(flow.flow_map.values().all(|&f| f.abs() < TOLERANCE));
    assert!(verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).is_ok());

    let cut = solver.minimum_cut(NodeId(0), NodeId(3)).unwrap();
    assert_eq!(cut.capacity, 0.0);
    assert!(cut.cut_edges.is_empty());
    assert!(cut.is_source_side(NodeId(1)));
    assert!(!cut.is_source_side(NodeId(2)));
}

#[test]
fn scenario_isolated_source() {
    let graph = build_graph(true, 3, &[(1, 2, 4.0)]);
    let value = PushRelabelSolver::new(&graph)
        .unwrap()
        .maximum_flow_value(NodeId(0), NodeId(2))
        .unwrap();
    assert_eq!(value, 0.0);
}

#[test]
fn scenario_single_undirected_edge() {
    let graph = build_graph(false, 2, &[(0, 1, 4.0)]);
    let mut solver = PushRelabelSolver::new(&graph).unwrap();

    let forward = solver.maximum_flow(NodeId(0), NodeId(1)).unwrap();
    assert_eq!(forward.value, 4.0);
    assert_eq!(forward.edge_flow(EdgeId(0)), 4.0);
    assert_eq!(forward.flow_direction(&graph, EdgeId(0)), NodeId(1));

    let backward = solver.maximum_flow(NodeId(1), NodeId(0)).unwrap();
    assert_eq!(backward.value, 4.0);
    assert_eq!(backward.edge_flow(EdgeId(0)), -4.0);
    assert_eq!(backward.flow_direction(&graph, EdgeId(0)), NodeId(0));
}

#[test]
fn undirected_cycle_uses_both_orientations() {
    // Square 0-1-2-3-0 with a diagonal 1-3
    let graph = build_graph(false, 4, &[(0, 1, 3.0), (1, 2, 2.0), (2, 3, 4.0), (3, 0, 2.0), (1, 3, 1.0)]);
    let mut solver = PushRelabelSolver::new(&graph).unwrap();
    let flow = solver.maximum_flow(NodeId(0), NodeId(2)).unwrap();

    assert!((flow.value - 5.0).abs() < TOLERANCE);
    // Declared 3 -> 0 carries flow away from the source
    assert!((flow.edge_flow(EdgeId(3)) + 2.0).abs() < TOLERANCE);
    assert!(verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).is_ok());

    let cut = solver.minimum_cut(NodeId(0), NodeId(2)).unwrap();
    assert!(verify_cut_duality(&flow, &cut, TOLERANCE).is_ok());
}

#[test]
fn fractional_capacities() {
    let graph = build_graph(true, 4, &[(0, 1, 0.5), (0, 2, 0.25), (1, 3, 0.3), (2, 3, 0.7), (1, 2, 0.1)]);
    let flow = PushRelabelSolver::new(&graph)
        .unwrap()
        .maximum_flow(NodeId(0), NodeId(3))
        .unwrap();

    assert!((flow.value - 0.65).abs() < TOLERANCE);
    assert!(verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).is_ok());
}

#[test]
fn self_loops_are_ignored() {
    let graph = build_graph(true, 3, &[(0, 1, 2.0), (1, 1, 9.0), (1, 2, 2.0)]);
    let flow = PushRelabelSolver::new(&graph)
        .unwrap()
        .maximum_flow(NodeId(0), NodeId(2))
        .unwrap();

    assert_eq!(flow.value, 2.0);
    assert_eq!(flow.edge_flow(EdgeId(1)), 0.0);
}

#[test]
fn antiparallel_directed_edges_are_distinct() {
    let graph = build_graph(true, 3, &[(0, 1, 4.0), (1, 0, 4.0), (1, 2, 3.0)]);
    let flow = PushRelabelSolver::new(&graph)
        .unwrap()
        .maximum_flow(NodeId(0), NodeId(2))
        .unwrap();

    assert_eq!(flow.value, 3.0);
    assert!(verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).is_ok());
}

#[test]
fn negative_capacity_is_rejected() {
    let graph = build_graph(true, 2, &[(0, 1, -1.0)]);
    assert!(matches!(
        PushRelabelSolver::new(&graph),
        Err(FlowError::InvalidGraphShape(_))
    ));
    assert!(matches!(
        EdmondsKarpSolver::new(&graph),
        Err(FlowError::InvalidGraphShape(_))
    ));
}

#[test]
fn infinite_capacity_is_rejected() {
    let graph = build_graph(true, 2, &[(0, 1, f64::INFINITY)]);
    assert!(matches!(
        PushRelabelSolver::new(&graph),
        Err(FlowError::InvalidGraphShape(_))
    ));
}

#[test]
fn parallel_edges_are_rejected() {
    let directed = build_graph(true, 2, &[(0, 1, 1.0), (0, 1, 2.0)]);
    assert!(matches!(
        PushRelabelSolver::new(&directed),
        Err(FlowError::InvalidGraphShape(_))
    ));

    let undirected = build_graph(false, 2, &[(0, 1, 1.0), (1, 0, 2.0)]);
    assert!(matches!(
        PushRelabelSolver::new(&undirected),
        Err(FlowError::InvalidGraphShape(_))
    ));
}

#[test]
fn invalid_terminals_are_rejected() {
    let graph = build_graph(true, 2, &[(0, 1, 1.0)]);
    let mut solver = PushRelabelSolver::new(&graph).unwrap();

    assert!(matches!(
        solver.maximum_flow(NodeId(1), NodeId(1)),
        Err(FlowError::InvalidArguments(_))
    ));
    assert!(matches!(
        solver.maximum_flow(NodeId(0), NodeId(7)),
        Err(FlowError::InvalidArguments(_))
    ));
    assert!(matches!(
        solver.minimum_cut(NodeId(7), NodeId(0)),
        Err(FlowError::InvalidArguments(_))
    ));
}

#[test]
fn configuration_from_json() {
    let config = FlowConfig::from_json(r#"{ "epsilon": 1e-6 }"#).unwrap();
    assert_eq!(config.epsilon, 1e-6);
    assert_eq!(FlowConfig::from_json("{}").unwrap(), FlowConfig::default());
    assert!(matches!(
        FlowConfig::from_json(r#"{ "epsilon": 0.0 }"#),
        Err(FlowError::InvalidConfiguration(_))
    ));

    let graph = build_graph(true, 2, &[(0, 1, 1.0)]);
    let solver = PushRelabelSolver::with_config(&graph, config).unwrap();
    assert_eq!(solver.get_parameter("epsilon"), Some(1e-6.to_string()));
}

#[test]
fn results_serialize_to_json() {
    let graph = build_graph(true, 3, &[(0, 1, 2.0), (1, 2, 1.0)]);
    let mut solver = PushRelabelSolver::new(&graph).unwrap();
    let flow = solver.maximum_flow(NodeId(0), NodeId(2)).unwrap();
    let cut = solver.minimum_cut(NodeId(0), NodeId(2)).unwrap();

    let json = serde_json::to_string(&cut).unwrap();
    let restored: graphflow::MinimumCut<NodeId, EdgeId> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, cut);
    assert_eq!(flow.value, restored.capacity);
}

#[test]
fn minimum_cut_matches_flow_value() {
    init_logging();
    let graph = build_graph(
        true,
        6,
        &[
            (0, 1, 16.0),
            (0, 2, 13.0),
            (1, 2, 10.0),
            (2, 1, 4.0),
            (1, 3, 12.0),
            (3, 2, 9.0),
            (2, 4, 14.0),
            (4, 3, 7.0),
            (3, 5, 20.0),
            (4, 5, 4.0),
        ],
    );
    let mut solver = PushRelabelSolver::new(&graph).unwrap();
    let flow = solver.maximum_flow(NodeId(0), NodeId(5)).unwrap();
    let cut = solver.minimum_cut(NodeId(0), NodeId(5)).unwrap();

    assert!((flow.value - 23.0).abs() < TOLERANCE);
    assert!((cut.capacity - 23.0).abs() < TOLERANCE);
    assert!(verify_cut_duality(&flow, &cut, TOLERANCE).is_ok());
    assert_eq!(cut.source_partition.len() + cut.sink_partition.len(), graph.vertex_count());
}

#[test]
fn random_directed_graphs_match_edmonds_karp() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..60 {
        let n = rng.gen_range(2..14);
        let graph = random_graph(&mut rng, true, n, 0.3);
        let source = NodeId(0);
        let sink = NodeId(n - 1);

        let mut metrics = FlowMetrics::new();
        let flow = PushRelabelSolver::new(&graph)
            .unwrap()
            .with_diagnostics(&mut metrics)
            .maximum_flow(source, sink)
            .unwrap();
        let reference = EdmondsKarpSolver::new(&graph)
            .unwrap()
            .maximum_flow_value(source, sink)
            .unwrap();

        assert!(
            (flow.value - reference).abs() < TOLERANCE,
            "push-relabel {} vs edmonds-karp {} on {} vertices",
            flow.value,
            reference,
            n
        );
        verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).unwrap();

        let cut = PushRelabelSolver::new(&graph).unwrap().minimum_cut(source, sink).unwrap();
        verify_cut_duality(&flow, &cut, TOLERANCE).unwrap();
    }
}

#[test]
fn random_undirected_graphs_match_edmonds_karp() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..40 {
        let n = rng.gen_range(2..12);
        let graph = random_graph(&mut rng, false, n, 0.25);
        let source = NodeId(rng.gen_range(0..n));
        let sink = NodeId((source.0 + 1 + rng.gen_range(0..n - 1)) % n);

        let mut solver = PushRelabelSolver::new(&graph).unwrap();
        let flow = solver.maximum_flow(source, sink).unwrap();
        let reference = EdmondsKarpSolver::new(&graph).unwrap().maximum_flow(source, sink).unwrap();

        assert!((flow.value - reference.value).abs() < TOLERANCE);
        verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).unwrap();
        verify_maximum_flow(&graph, &reference, DEFAULT_EPSILON).unwrap();

        let cut = solver.minimum_cut(source, sink).unwrap();
        verify_cut_duality(&flow, &cut, TOLERANCE).unwrap();
    }
}

/// Fails the solve loudly once relabels pass a fixed budget
struct RelabelBudget {
    remaining: usize,
}

impl FlowDiagnostics for RelabelBudget {
    fn record_discharge(&mut self, _arc: usize, _amount: Flow) {}

    fn record_relabel(&mut self, vertex: usize, old_label: DistanceLabel, new_label: DistanceLabel) {
        assert!(
            self.remaining > 0,
            "relabel budget exhausted at vertex {} ({} -> {})",
            vertex,
            old_label,
            new_label
        );
        self.remaining -= 1;
    }
}

#[test]
fn random_large_fractional_capacities_match_edmonds_karp() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x1e12);

    for round in 0..200 {
        let n = rng.gen_range(2..12);
        let directed = round % 2 == 0;
        // Magnitudes spread from 1 to 1e12 within a single graph
        let graph = random_graph_with(&mut rng, directed, n, 0.3, |rng| {
            rng.gen::<f64>() * 10f64.powf(rng.gen_range(0.0..12.0))
        });
        let source = NodeId(0);
        let sink = NodeId(n - 1);
        let largest = graph.get_edges().iter().map(|e| e.weight).fold(1.0, f64::max);

        let mut budget = RelabelBudget { remaining: 3 * n * n + n };
        let flow = PushRelabelSolver::new(&graph)
            .unwrap()
            .with_diagnostics(&mut budget)
            .maximum_flow(source, sink)
            .unwrap();
        let reference = EdmondsKarpSolver::new(&graph)
            .unwrap()
            .maximum_flow_value(source, sink)
            .unwrap();

        assert!(
            (flow.value - reference).abs() <= 1e-9 * largest * n as f64,
            "push-relabel {} vs edmonds-karp {} on {} vertices",
            flow.value,
            reference,
            n
        );
        verify_maximum_flow(&graph, &flow, DEFAULT_EPSILON).unwrap();
    }
}
