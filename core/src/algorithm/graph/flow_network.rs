//! Capacitated residual network over an arbitrary graph view
//!
//! The network wraps a directed or undirected `FlowGraph` as a set of
//! annotated arcs so that flow algorithms can be written once. Every original
//! edge `(u, v)` with weight `w` yields a forward arc `u -> v` of capacity `w`
//! and an inverse arc `v -> u`, linked to each other by arena index. The
//! inverse carries capacity `0` for directed graphs (a pure residual arc) and
//! capacity `w` for undirected graphs, where both directions are real pipes.
//!
//! # Residual Model
//!
//! Each arc keeps its own non-negative flow, bounded by its capacity, and at
//! most one arc of a pair carries positive flow at any time:
//!
//! - residual(e) = capacity(e) - flow(e) + flow(inverse(e))
//! - pushing `delta` along `e` first cancels flow on the inverse, then
//!   raises flow(e) by the remainder
//! - net flow in the direction of `e` is flow(e) - flow(inverse(e))
//!
//! # Tolerance
//!
//! Comparisons use `epsilon * max(1, largest capacity)`, fixed when the
//! network is built. Flows of magnitude `c` carry rounding error around
//! `c * 2^-52`, and the threshold has to grow with them.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::extension::ExtensionManager;
use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::graph::FlowGraph;

/// Flow capacity type
pub type Capacity = f64;

/// Flow value type
pub type Flow = f64;

/// Distance label type for push-relabel
pub type DistanceLabel = usize;

/// Default tolerance for every floating comparison
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Flow algorithm errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    /// Negative, non-finite or parallel edges
    #[error("Invalid graph shape: {0}")]
    InvalidGraphShape(String),

    /// Bad source/sink selection
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A flow invariant was broken; this is a bug, not a runtime condition
    #[error("Internal invariant violation: {0}")]
    InternalInvariantViolation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<FlowError> for AlgorithmError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidGraphShape(reason) => AlgorithmError::InvalidGraph(reason),
            FlowError::InvalidConfiguration(reason) => AlgorithmError::InvalidParameter {
                name: "epsilon".to_string(),
                reason,
            },
            other => AlgorithmError::ExecutionError(other.to_string()),
        }
    }
}

/// Tunables shared by every flow algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Tolerance for comparisons against zero and between flow values
    pub epsilon: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { epsilon: DEFAULT_EPSILON }
    }
}

impl FlowConfig {
    pub fn with_epsilon(epsilon: f64) -> Result<Self, FlowError> {
        let config = Self { epsilon };
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document such as `{"epsilon": 1e-6}`; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FlowError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(FlowError::InvalidConfiguration(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Identity of an annotated arc in terms of the original edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcKey<E> {
    /// Arc in the edge's declared direction
    Forward(E),
    /// Residual partner of the forward arc
    Inverse(E),
}

impl<E: Copy> ArcKey<E> {
    pub fn edge(&self) -> E {
        match *self {
            ArcKey::Forward(e) | ArcKey::Inverse(e) => e,
        }
    }
}

/// Per-vertex extension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexExtension {
    /// Distance label, governs admissibility
    pub label: DistanceLabel,
    /// Flow received but not yet forwarded
    pub excess: Flow,
    /// Arena indices of arcs leaving this vertex
    pub outgoing: Vec<usize>,
}

/// Per-arc extension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedEdge {
    /// Vertex arena index of the tail
    pub source: usize,
    /// Vertex arena index of the head
    pub target: usize,
    pub capacity: Capacity,
    pub flow: Flow,
    /// Arc arena index of the residual partner
    pub inverse: usize,
}

/// Residual network built from a graph view
#[derive(Debug)]
pub struct FlowNetwork<V, E> {
    directed: bool,
    epsilon: f64,
    /// Epsilon scaled by the largest capacity
    tolerance: f64,
    vertices: ExtensionManager<V, VertexExtension>,
    arcs: ExtensionManager<ArcKey<E>, AnnotatedEdge>,
}

impl<V, E> FlowNetwork<V, E>
where
    V: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    /// Builds the network, walking every edge of `graph` once
    ///
    /// Rejects negative or non-finite weights and parallel edges. Self-loops
    /// are skipped since they can never carry net flow.
    pub fn build<G>(graph: &G, epsilon: f64) -> Result<Self, FlowError>
    where
        G: FlowGraph<Vertex = V, Edge = E>,
    {
        FlowConfig { epsilon }.validate()?;

        let directed = graph.is_directed();
        let graph_vertices = graph.vertices();
        let graph_edges = graph.edges();

        let mut vertices = ExtensionManager::with_capacity(graph_vertices.len(), VertexExtension::default);
        let mut arcs = ExtensionManager::with_capacity(2 * graph_edges.len(), AnnotatedEdge::default);

        for &vertex in &graph_vertices {
            vertices.extension_index(vertex);
        }

        let mut seen_pairs: HashSet<(usize, usize)> = HashSet::with_capacity(graph_edges.len());
        let mut max_capacity: Capacity = 0.0;

        for &edge in &graph_edges {
            let weight = graph.edge_weight(edge);
            if !weight.is_finite() || weight < 0.0 {
                return Err(FlowError::InvalidGraphShape(format!(
                    "edge {:?} has capacity {}; capacities must be finite and non-negative",
                    edge, weight
                )));
            }

            let u = vertices.extension_index(graph.edge_source(edge));
            let v = vertices.extension_index(graph.edge_target(edge));
            if u == v {
                trace!("Skipping self-loop {:?}", edge);
                continue;
            }

            let pair = if directed { (u, v) } else { (u.min(v), u.max(v)) };
            if !seen_pairs.insert(pair) {
                return Err(FlowError::InvalidGraphShape(format!(
                    "parallel edge {:?} between {:?} and {:?}",
                    edge,
                    graph.edge_source(edge),
                    graph.edge_target(edge)
                )));
            }

            max_capacity = max_capacity.max(weight);
            let forward = arcs.extension_index(ArcKey::Forward(edge));
            let inverse = arcs.extension_index(ArcKey::Inverse(edge));

            arcs[forward] = AnnotatedEdge {
                source: u,
                target: v,
                capacity: weight,
                flow: 0.0,
                inverse,
            };
            arcs[inverse] = AnnotatedEdge {
                source: v,
                target: u,
                capacity: if directed { 0.0 } else { weight },
                flow: 0.0,
                inverse: forward,
            };

            vertices[u].outgoing.push(forward);
            vertices[v].outgoing.push(inverse);
        }

        let tolerance = epsilon * max_capacity.max(1.0);
        debug!(
            "Built {} flow network: {} vertices, {} arcs, tolerance {}",
            if directed { "directed" } else { "undirected" },
            vertices.len(),
            arcs.len(),
            tolerance
        );

        Ok(Self {
            directed,
            epsilon,
            tolerance,
            vertices,
            arcs,
        })
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Threshold below which residual capacity and excess count as zero
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Arena index of an original vertex
    pub fn vertex_index(&self, vertex: V) -> Option<usize> {
        self.vertices.lookup(vertex)
    }

    /// Original vertex behind an arena index
    pub fn vertex_prototype(&self, index: usize) -> Option<V> {
        self.vertices.prototype(index)
    }

    pub fn vertex(&self, index: usize) -> &VertexExtension {
        &self.vertices[index]
    }

    pub fn vertex_mut(&mut self, index: usize) -> &mut VertexExtension {
        &mut self.vertices[index]
    }

    /// Arcs leaving the vertex at `index`
    pub fn outgoing(&self, index: usize) -> &[usize] {
        &self.vertices[index].outgoing
    }

    pub fn arc(&self, index: usize) -> &AnnotatedEdge {
        &self.arcs[index]
    }

    /// Original edge an arc was built from, with its orientation
    pub fn arc_key(&self, index: usize) -> Option<ArcKey<E>> {
        self.arcs.prototype(index)
    }

    /// Arena index of the forward arc of an original edge
    pub fn forward_arc(&self, edge: E) -> Option<usize> {
        self.arcs.lookup(ArcKey::Forward(edge))
    }

    pub fn residual_capacity(&self, arc: usize) -> Capacity {
        let annotated = &self.arcs[arc];
        annotated.capacity - annotated.flow + self.arcs[annotated.inverse].flow
    }

    pub fn has_capacity(&self, arc: usize) -> bool {
        self.residual_capacity(arc) > self.tolerance
    }

    /// Net flow along an arc's direction
    pub fn net_flow(&self, arc: usize) -> Flow {
        let annotated = &self.arcs[arc];
        annotated.flow - self.arcs[annotated.inverse].flow
    }

    /// Net flow of an original edge in its declared direction; `0.0` for skipped edges
    pub fn edge_flow(&self, edge: E) -> Flow {
        self.forward_arc(edge).map_or(0.0, |arc| self.net_flow(arc))
    }

    /// Net flow arriving at the vertex at `index`
    ///
    /// Every arc entering a vertex is the inverse of an arc leaving it, so
    /// summing over the outgoing list accounts for each pair exactly once.
    pub fn net_inflow(&self, index: usize) -> Flow {
        self.vertices[index]
            .outgoing
            .iter()
            .map(|&arc| -self.net_flow(arc))
            .sum::<Flow>()
            + 0.0
    }

    /// Moves `delta` units of flow along `arc`, cancelling inverse flow first
    pub fn push_flow_through(&mut self, arc: usize, delta: Flow) -> Result<(), FlowError> {
        let inverse = self.arcs[arc].inverse;
        let cancelled = delta.min(self.arcs[inverse].flow);
        self.arcs[inverse].flow -= cancelled;
        self.arcs[arc].flow += delta - cancelled;

        let forward = &self.arcs[arc];
        if forward.flow > forward.capacity + self.tolerance {
            let message = format!(
                "arc {} carries {} over capacity {}",
                arc, forward.flow, forward.capacity
            );
            error!("{}", message);
            return Err(FlowError::InternalInvariantViolation(message));
        }
        if self.arcs[inverse].flow < -self.tolerance {
            let message = format!("arc {} carries negative flow {}", inverse, self.arcs[inverse].flow);
            error!("{}", message);
            return Err(FlowError::InternalInvariantViolation(message));
        }
        Ok(())
    }

    /// Vertices reachable from `from` through arcs with residual capacity
    pub fn residual_reachable(&self, from: usize) -> Vec<bool> {
        let mut reached = vec![false; self.vertices.len()];
        let mut queue = VecDeque::new();
        reached[from] = true;
        queue.push_back(from);

        while let Some(vertex) = queue.pop_front() {
            for &arc in self.outgoing(vertex) {
                let target = self.arcs[arc].target;
                if !reached[target] && self.has_capacity(arc) {
                    reached[target] = true;
                    queue.push_back(target);
                }
            }
        }
        reached
    }
}
