//! Maximum flow and minimum cut results
//!
//! After a solver has finished, its residual network is translated back into
//! terms of the original graph: a net flow per original edge, the flow value,
//! and, on request, the minimum cut given by residual reachability from the
//! source.
//!
//! # Sign Convention
//! Edge flows are net values in the edge's declared direction. For
//! undirected edges a negative value means the flow travels from the
//! declared target to the declared source.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::flow_network::{Capacity, Flow, FlowError, FlowNetwork};
use crate::data_structures::graph::FlowGraph;

/// Maximum flow between a source and a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaximumFlow<V, E>
where
    E: Eq + Hash,
{
    pub source: V,
    pub sink: V,
    /// Net flow arriving at the sink
    pub value: Flow,
    /// Net flow per original edge, in its declared direction
    pub flow_map: HashMap<E, Flow>,
}

impl<V, E> MaximumFlow<V, E>
where
    V: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn value(&self) -> Flow {
        self.value
    }

    pub fn flow_map(&self) -> &HashMap<E, Flow> {
        &self.flow_map
    }

    /// Net flow on `edge`; `0.0` for edges absent from the map
    pub fn edge_flow(&self, edge: E) -> Flow {
        self.flow_map.get(&edge).copied().unwrap_or(0.0)
    }

    /// Endpoint the flow on `edge` travels toward
    ///
    /// Always the declared target for directed graphs. For undirected graphs
    /// the declared source is returned when the net flow is negative.
    pub fn flow_direction<G>(&self, graph: &G, edge: E) -> V
    where
        G: FlowGraph<Vertex = V, Edge = E>,
    {
        if !graph.is_directed() && self.edge_flow(edge) < 0.0 {
            graph.edge_source(edge)
        } else {
            graph.edge_target(edge)
        }
    }
}

/// Minimum source/sink cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumCut<V, E>
where
    V: Eq + Hash,
{
    /// Vertices reachable from the source in the final residual network
    pub source_partition: HashSet<V>,
    pub sink_partition: HashSet<V>,
    /// Original edges leaving the source partition (either orientation when undirected)
    pub cut_edges: Vec<E>,
    /// Total capacity of the cut edges
    pub capacity: Capacity,
}

impl<V, E> MinimumCut<V, E>
where
    V: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn is_source_side(&self, vertex: V) -> bool {
        self.source_partition.contains(&vertex)
    }
}

/// Translates a finished residual network into a `MaximumFlow`
pub(crate) fn compose_maximum_flow<G>(
    graph: &G,
    network: &FlowNetwork<G::Vertex, G::Edge>,
    source: G::Vertex,
    sink: G::Vertex,
) -> Result<MaximumFlow<G::Vertex, G::Edge>, FlowError>
where
    G: FlowGraph,
{
    let sink_index = network
        .vertex_index(sink)
        .ok_or_else(|| FlowError::InvalidArguments(format!("sink {:?} is not in the network", sink)))?;

    let flow_map = graph
        .edges()
        .into_iter()
        .map(|edge| (edge, network.edge_flow(edge)))
        .collect();

    Ok(MaximumFlow {
        source,
        sink,
        value: network.net_inflow(sink_index),
        flow_map,
    })
}

/// Derives the minimum cut from residual reachability of the source
pub(crate) fn compose_minimum_cut<G>(
    graph: &G,
    network: &FlowNetwork<G::Vertex, G::Edge>,
    source: G::Vertex,
) -> Result<MinimumCut<G::Vertex, G::Edge>, FlowError>
where
    G: FlowGraph,
{
    let source_index = network
        .vertex_index(source)
        .ok_or_else(|| FlowError::InvalidArguments(format!("source {:?} is not in the network", source)))?;
    let reached = network.residual_reachable(source_index);
    let on_source_side = |vertex: G::Vertex| network.vertex_index(vertex).map_or(false, |i| reached[i]);

    let (source_partition, sink_partition): (HashSet<_>, HashSet<_>) =
        graph.vertices().into_iter().partition(|&v| on_source_side(v));

    let mut cut_edges = Vec::new();
    let mut capacity = 0.0;
    for edge in graph.edges() {
        let tail = on_source_side(graph.edge_source(edge));
        let head = on_source_side(graph.edge_target(edge));
        let crosses = if graph.is_directed() { tail && !head } else { tail != head };
        if crosses {
            cut_edges.push(edge);
            capacity += graph.edge_weight(edge);
        }
    }

    Ok(MinimumCut {
        source_partition,
        sink_partition,
        cut_edges,
        capacity,
    })
}
