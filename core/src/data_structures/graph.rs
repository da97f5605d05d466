//! Graph capability interface and reference adjacency-list graph
//!
//! Flow algorithms never depend on a concrete graph representation. They
//! consume the narrow `FlowGraph` capability (vertex and edge sets, endpoint
//! and weight queries, incidence queries, directedness), so any storage that
//! can answer those questions can be analysed without conversion.
//!
//! `Graph` is the reference implementation: dense `NodeId`/`EdgeId`
//! identifiers, per-vertex outgoing and incoming edge lists, and a
//! directed/undirected flag fixed at construction.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{AlgorithmError, EdgeId, NodeId};

/// Edge weight, interpreted as capacity by flow algorithms
pub type Weight = f64;

/// Read-only view of a graph as required by flow algorithms
///
/// Identifiers must be cheap to copy and hashable: the extension tables
/// built by the algorithms are keyed by them.
pub trait FlowGraph {
    /// Vertex identifier
    type Vertex: Copy + Eq + Hash + Debug;

    /// Edge identifier
    type Edge: Copy + Eq + Hash + Debug;

    /// Whether edges carry a direction
    fn is_directed(&self) -> bool;

    /// All vertices of the graph
    fn vertices(&self) -> Vec<Self::Vertex>;

    /// All edges of the graph
    fn edges(&self) -> Vec<Self::Edge>;

    /// Membership test for a vertex
    fn contains_vertex(&self, vertex: Self::Vertex) -> bool;

    /// Number of vertices
    fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    /// Declared source endpoint of an edge
    fn edge_source(&self, edge: Self::Edge) -> Self::Vertex;

    /// Declared target endpoint of an edge
    fn edge_target(&self, edge: Self::Edge) -> Self::Vertex;

    /// Weight of an edge
    fn edge_weight(&self, edge: Self::Edge) -> Weight;

    /// Edges leaving `vertex`; for undirected graphs every incident edge
    fn outgoing_edges(&self, vertex: Self::Vertex) -> Vec<Self::Edge>;

    /// Edges touching `vertex` in either role
    fn incident_edges(&self, vertex: Self::Vertex) -> Vec<Self::Edge>;

    /// Endpoint of `edge` that is not `vertex`
    fn opposite(&self, edge: Self::Edge, vertex: Self::Vertex) -> Self::Vertex {
        let source = self.edge_source(edge);
        if source == vertex {
            self.edge_target(edge)
        } else {
            source
        }
    }
}

/// Stored edge record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: Weight,
}

/// Adjacency-list graph with dense identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    node_count: usize,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl Graph {
    /// Creates an empty directed graph
    pub fn directed() -> Self {
        Self::with_nodes(true, 0)
    }

    /// Creates an empty undirected graph
    pub fn undirected() -> Self {
        Self::with_nodes(false, 0)
    }

    /// Creates a graph with `node_count` isolated vertices `0..node_count`
    pub fn with_nodes(directed: bool, node_count: usize) -> Self {
        Self {
            directed,
            node_count,
            edges: Vec::new(),
            outgoing: vec![Vec::new(); node_count],
            incoming: vec![Vec::new(); node_count],
        }
    }

    /// Adds an isolated vertex and returns its identifier
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.node_count);
        self.node_count += 1;
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds an edge between existing vertices
    ///
    /// Parallel edges and self-loops are accepted here; algorithms that
    /// cannot handle them reject the graph themselves.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: Weight) -> Result<EdgeId, AlgorithmError> {
        if source.0 >= self.node_count {
            return Err(AlgorithmError::InvalidNode(source));
        }
        if target.0 >= self.node_count {
            return Err(AlgorithmError::InvalidNode(target));
        }
        if weight.is_nan() {
            return Err(AlgorithmError::InvalidGraph(format!(
                "edge {} -> {} has NaN weight",
                source, target
            )));
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { source, target, weight });
        self.outgoing[source.0].push(id);
        self.incoming[target.0].push(id);
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn get_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges joining `source` to `target` (either orientation when undirected)
    pub fn find_edges(&self, source: NodeId, target: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                (e.source == source && e.target == target)
                    || (!self.directed && e.source == target && e.target == source)
            })
            .map(|(i, _)| EdgeId(i))
            .collect()
    }

    fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }
}

impl FlowGraph for Graph {
    type Vertex = NodeId;
    type Edge = EdgeId;

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn vertices(&self) -> Vec<NodeId> {
        (0..self.node_count).map(NodeId).collect()
    }

    fn edges(&self) -> Vec<EdgeId> {
        (0..self.edges.len()).map(EdgeId).collect()
    }

    fn contains_vertex(&self, vertex: NodeId) -> bool {
        vertex.0 < self.node_count
    }

    fn vertex_count(&self) -> usize {
        self.node_count
    }

    fn edge_source(&self, edge: EdgeId) -> NodeId {
        self.edge(edge).source
    }

    fn edge_target(&self, edge: EdgeId) -> NodeId {
        self.edge(edge).target
    }

    fn edge_weight(&self, edge: EdgeId) -> Weight {
        self.edge(edge).weight
    }

    fn outgoing_edges(&self, vertex: NodeId) -> Vec<EdgeId> {
        if self.directed {
            self.outgoing.get(vertex.0).cloned().unwrap_or_default()
        } else {
            self.incident_edges(vertex)
        }
    }

    fn incident_edges(&self, vertex: NodeId) -> Vec<EdgeId> {
        let mut incident = self.outgoing.get(vertex.0).cloned().unwrap_or_default();
        if let Some(incoming) = self.incoming.get(vertex.0) {
            // Self-loops already appear in the outgoing list
            incident.extend(incoming.iter().filter(|&&e| self.edge(e).source != vertex));
        }
        incident
    }
}
