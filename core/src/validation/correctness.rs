//! Flow Correctness Verification
//!
//! Independent checks of a computed maximum flow against the graph it was
//! computed on. Nothing here trusts solver internals: only the reported edge
//! flows, the graph capacities and the reported value are inspected.
//!
//! # Verified Properties
//! - **Capacity respect**: `0 <= f(e) <= c(e)` for directed edges,
//!   `|f(e)| <= c(e)` for undirected edges
//! - **Conservation**: inflow equals outflow at every vertex except the
//!   source and the sink
//! - **Value agreement**: the reported value equals both the net outflow of
//!   the source and the net inflow of the sink
//! - **Duality**: the value equals the capacity of a reported minimum cut
//!
//! Per-vertex and per-edge checks run on the rayon thread pool; the graph is
//! only read.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::graph::flow_network::Flow;
use crate::algorithm::graph::flow_result::{MaximumFlow, MinimumCut};
use crate::data_structures::graph::FlowGraph;

/// Verification failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    #[error("edge {edge} carries {flow} outside its capacity {capacity}")]
    CapacityViolated { edge: String, flow: Flow, capacity: Flow },

    #[error("vertex {vertex} is unbalanced by {imbalance}")]
    ConservationViolated { vertex: String, imbalance: Flow },

    #[error("reported value {reported} disagrees with source outflow {outflow} or sink inflow {inflow}")]
    ValueMismatch { reported: Flow, outflow: Flow, inflow: Flow },

    #[error("cut capacity {cut_capacity} differs from flow value {flow_value}")]
    DualityViolated { flow_value: Flow, cut_capacity: Flow },

    #[error("Invalid verification input: {0}")]
    InvalidInput(String),
}

/// Summary of a successful verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowVerification {
    pub source_outflow: Flow,
    pub sink_inflow: Flow,
    /// Largest conservation error among intermediate vertices
    pub max_imbalance: Flow,
    /// Tolerance the checks were run with
    pub tolerance: Flow,
    pub edges_checked: usize,
    pub vertices_checked: usize,
}

/// Checks capacity respect, conservation and value agreement of `flow`
///
/// The tolerance is `epsilon` scaled by one plus the total capacity of the
/// graph, so that rounding in long sums is not reported as a violation.
pub fn verify_maximum_flow<G>(
    graph: &G,
    flow: &MaximumFlow<G::Vertex, G::Edge>,
    epsilon: f64,
) -> Result<FlowVerification, VerificationError>
where
    G: FlowGraph + Sync,
    G::Vertex: Send + Sync,
    G::Edge: Send + Sync,
{
    if !graph.contains_vertex(flow.source) || !graph.contains_vertex(flow.sink) {
        return Err(VerificationError::InvalidInput(format!(
            "terminals {:?} -> {:?} are not in the graph",
            flow.source, flow.sink
        )));
    }

    let edges = graph.edges();
    let total_capacity: f64 = edges.iter().map(|&e| graph.edge_weight(e).abs()).sum();
    let tolerance = epsilon * (1.0 + total_capacity);
    let directed = graph.is_directed();

    let violation = edges.par_iter().find_map_any(|&edge| {
        let value = flow.edge_flow(edge);
        let capacity = graph.edge_weight(edge);
        let within = if directed {
            value >= -tolerance && value <= capacity + tolerance
        } else {
            value.abs() <= capacity + tolerance
        };
        (!within).then(|| VerificationError::CapacityViolated {
            edge: format!("{:?}", edge),
            flow: value,
            capacity,
        })
    });
    if let Some(err) = violation {
        return Err(err);
    }

    let net_inflow = net_inflow_by_vertex(graph, flow, &edges);
    let inflow_at = |vertex: &G::Vertex| net_inflow.get(vertex).copied().unwrap_or(0.0);

    let vertices = graph.vertices();
    let intermediate: Vec<G::Vertex> = vertices
        .into_iter()
        .filter(|&v| v != flow.source && v != flow.sink)
        .collect();

    if let Some((vertex, imbalance)) = intermediate
        .par_iter()
        .map(|v| (*v, inflow_at(v)))
        .find_any(|(_, imbalance)| imbalance.abs() > tolerance)
    {
        return Err(VerificationError::ConservationViolated {
            vertex: format!("{:?}", vertex),
            imbalance,
        });
    }
    let max_imbalance = intermediate
        .par_iter()
        .map(|v| inflow_at(v).abs())
        .reduce(|| 0.0, f64::max);

    let source_outflow = -inflow_at(&flow.source);
    let sink_inflow = inflow_at(&flow.sink);
    if (flow.value - source_outflow).abs() > tolerance || (flow.value - sink_inflow).abs() > tolerance {
        return Err(VerificationError::ValueMismatch {
            reported: flow.value,
            outflow: source_outflow,
            inflow: sink_inflow,
        });
    }

    Ok(FlowVerification {
        source_outflow,
        sink_inflow,
        max_imbalance,
        tolerance,
        edges_checked: edges.len(),
        vertices_checked: intermediate.len(),
    })
}

/// Checks that `cut` separates the terminals and that its capacity equals the flow value
pub fn verify_cut_duality<V, E>(
    flow: &MaximumFlow<V, E>,
    cut: &MinimumCut<V, E>,
    epsilon: f64,
) -> Result<(), VerificationError>
where
    V: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    if !cut.is_source_side(flow.source) || cut.is_source_side(flow.sink) {
        return Err(VerificationError::InvalidInput(format!(
            "cut does not separate {:?} from {:?}",
            flow.source, flow.sink
        )));
    }
    if (flow.value - cut.capacity).abs() > epsilon * (1.0 + flow.value.abs()) {
        return Err(VerificationError::DualityViolated {
            flow_value: flow.value,
            cut_capacity: cut.capacity,
        });
    }
    Ok(())
}

fn net_inflow_by_vertex<G: FlowGraph>(
    graph: &G,
    flow: &MaximumFlow<G::Vertex, G::Edge>,
    edges: &[G::Edge],
) -> HashMap<G::Vertex, Flow> {
    let mut net = HashMap::with_capacity(graph.vertex_count());
    for &edge in edges {
        let value = flow.edge_flow(edge);
        *net.entry(graph.edge_target(edge)).or_insert(0.0) += value;
        *net.entry(graph.edge_source(edge)).or_insert(0.0) -= value;
    }
    net
}
