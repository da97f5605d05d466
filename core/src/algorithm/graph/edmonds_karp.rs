//! Edmonds-Karp Maximum Flow
//!
//! Shortest augmenting paths found by breadth-first search over the same
//! residual network the push-relabel solver uses. Slower in the worst case
//! (O(V E²)) but simple enough to serve as an independent reference when
//! validating other solvers.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;
use std::fmt;

use log::{info, trace};

use crate::algorithm::graph::diagnostics::FlowDiagnostics;
use crate::algorithm::graph::flow_network::{Flow, FlowConfig, FlowError, FlowNetwork};
use crate::algorithm::graph::flow_result::{compose_maximum_flow, compose_minimum_cut, MaximumFlow, MinimumCut};
use crate::algorithm::graph::max_flow::{apply_flow_parameter, flow_parameters, validate_terminals, MaximumFlowAlgorithm};
use crate::algorithm::traits::{Algorithm, AlgorithmComplexity, AlgorithmError, AlgorithmId, AlgorithmParameter};
use crate::data_structures::graph::FlowGraph;

/// Breadth-first augmenting path solver
pub struct EdmondsKarpSolver<'g, 'd, G: FlowGraph> {
    graph: &'g G,
    config: FlowConfig,
    diagnostics: Option<&'d mut dyn FlowDiagnostics>,
    network: FlowNetwork<G::Vertex, G::Edge>,
}

impl<'g, 'd, G: FlowGraph> EdmondsKarpSolver<'g, 'd, G> {
    pub fn new(graph: &'g G) -> Result<Self, FlowError> {
        Self::with_config(graph, FlowConfig::default())
    }

    pub fn with_config(graph: &'g G, config: FlowConfig) -> Result<Self, FlowError> {
        config.validate()?;
        let network = FlowNetwork::build(graph, config.epsilon)?;
        Ok(Self {
            graph,
            config,
            diagnostics: None,
            network,
        })
    }

    pub fn with_diagnostics(mut self, diagnostics: &'d mut dyn FlowDiagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn network(&self) -> &FlowNetwork<G::Vertex, G::Edge> {
        &self.network
    }

    /// Augments along shortest residual paths until none remains
    pub fn calculate_maximum_flow(&mut self, source: G::Vertex, sink: G::Vertex) -> Result<Flow, FlowError> {
        validate_terminals(self.graph, source, sink)?;
        self.network = FlowNetwork::build(self.graph, self.config.epsilon)?;

        let missing = || FlowError::InvalidArguments("terminal missing from network".to_string());
        let s = self.network.vertex_index(source).ok_or_else(missing)?;
        let t = self.network.vertex_index(sink).ok_or_else(missing)?;

        let mut total = 0.0;
        while let Some(path) = self.shortest_path(s, t) {
            let bottleneck = path
                .iter()
                .map(|&arc| self.network.residual_capacity(arc))
                .fold(f64::INFINITY, f64::min);

            for &arc in &path {
                self.network.push_flow_through(arc, bottleneck)?;
            }
            total += bottleneck;

            trace!("Augmented {} along {} arcs", bottleneck, path.len());
            if let Some(diagnostics) = self.diagnostics.as_mut() {
                diagnostics.record_augmentation(path.len(), bottleneck);
            }
        }

        info!("Edmonds-Karp maximum flow {:?} -> {:?}: {}", source, sink, total);
        Ok(total)
    }

    /// Arcs of a shortest residual path from `s` to `t`, if any
    fn shortest_path(&self, s: usize, t: usize) -> Option<Vec<usize>> {
        let mut parent_arc: Vec<Option<usize>> = vec![None; self.network.vertex_count()];
        let mut visited = vec![false; self.network.vertex_count()];
        let mut queue = VecDeque::new();
        visited[s] = true;
        queue.push_back(s);

        while let Some(vertex) = queue.pop_front() {
            if vertex == t {
                break;
            }
            for &arc in self.network.outgoing(vertex) {
                let target = self.network.arc(arc).target;
                if !visited[target] && self.network.has_capacity(arc) {
                    visited[target] = true;
                    parent_arc[target] = Some(arc);
                    queue.push_back(target);
                }
            }
        }

        if !visited[t] {
            return None;
        }

        let mut path = Vec::new();
        let mut vertex = t;
        while let Some(arc) = parent_arc[vertex] {
            path.push(arc);
            vertex = self.network.arc(arc).source;
        }
        path.reverse();
        Some(path)
    }
}

impl<'g, 'd, G: FlowGraph> MaximumFlowAlgorithm for EdmondsKarpSolver<'g, 'd, G> {
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn maximum_flow(&mut self, source: G::Vertex, sink: G::Vertex) -> Result<MaximumFlow<G::Vertex, G::Edge>, FlowError> {
        self.calculate_maximum_flow(source, sink)?;
        compose_maximum_flow(self.graph, &self.network, source, sink)
    }

    fn maximum_flow_value(&mut self, source: G::Vertex, sink: G::Vertex) -> Result<Flow, FlowError> {
        self.calculate_maximum_flow(source, sink)
    }

    fn minimum_cut(&mut self, source: G::Vertex, sink: G::Vertex) -> Result<MinimumCut<G::Vertex, G::Edge>, FlowError> {
        self.calculate_maximum_flow(source, sink)?;
        compose_minimum_cut(self.graph, &self.network, source)
    }
}

impl<'g, 'd, G: FlowGraph> Algorithm for EdmondsKarpSolver<'g, 'd, G> {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::new("edmonds_karp")
    }

    fn name(&self) -> &'static str {
        "Edmonds-Karp"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> String {
        "Ford-Fulkerson with breadth-first shortest augmenting paths.".to_string()
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time_complexity: "O(V E^2)".to_string(),
            space_complexity: "O(V + E)".to_string(),
            best_case: "O(V + E)".to_string(),
            average_case: "O(V E^2)".to_string(),
            worst_case: "O(V E^2)".to_string(),
        }
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        flow_parameters(&self.config)
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        apply_flow_parameter(&mut self.config, name, value)
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        (name == "epsilon").then(|| self.config.epsilon.to_string())
    }
}

impl<'g, 'd, G: FlowGraph> fmt::Debug for EdmondsKarpSolver<'g, 'd, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdmondsKarpSolver")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::diagnostics::FlowMetrics;
    use crate::algorithm::traits::NodeId;
    use crate::data_structures::graph::Graph;

    #[test]
    fn test_augmenting_paths() {
        let mut graph = Graph::with_nodes(true, 4);
        for &(u, v, w) in &[(0, 1, 3.0), (0, 2, 2.0), (1, 2, 1.0), (1, 3, 2.0), (2, 3, 3.0)] {
            graph.add_edge(NodeId(u), NodeId(v), w).unwrap();
        }

        let mut metrics = FlowMetrics::new();
        {
            let mut solver = EdmondsKarpSolver::new(&graph).unwrap().with_diagnostics(&mut metrics);
            assert_eq!(solver.maximum_flow_value(NodeId(0), NodeId(3)).unwrap(), 5.0);
        }
        assert_eq!(metrics.augmentations, 3);
        assert_eq!(metrics.flow_moved, 5.0);
    }

    #[test]
    fn test_no_path() {
        let graph = Graph::with_nodes(true, 2);
        let mut solver = EdmondsKarpSolver::new(&graph).unwrap();
        let value = solver.maximum_flow_value(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
        assert!(solver.maximum_flow(NodeId(0), NodeId(1)).unwrap().value.is_sign_positive());
        assert_eq!(solver.name(), "Edmonds-Karp");
        assert_eq!(solver.get_parameter("epsilon"), Some(1e-9.to_string()));
        assert_eq!(solver.get_parameter("other"), None);
    }

    #[test]
    fn test_invalid_terminals() {
        let graph = Graph::with_nodes(true, 2);
        let mut solver = EdmondsKarpSolver::new(&graph).unwrap();
        assert!(matches!(
            solver.maximum_flow(NodeId(1), NodeId(1)),
            Err(FlowError::InvalidArguments(_))
        ));
    }
}
