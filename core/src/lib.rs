//! # GraphFlow
//!
//! Maximum flow and minimum cut over any graph exposing the `FlowGraph`
//! capability. The core is a FIFO push-relabel solver whose per-vertex and
//! per-edge state lives in extension tables beside the graph, so the input
//! is only ever borrowed immutably.
//!
//! ```
//! use graphflow::{Graph, MaximumFlowAlgorithm, NodeId, PushRelabelSolver};
//!
//! let mut graph = Graph::with_nodes(true, 2);
//! graph.add_edge(NodeId(0), NodeId(1), 5.0).unwrap();
//!
//! let mut solver = PushRelabelSolver::new(&graph).unwrap();
//! let flow = solver.maximum_flow(NodeId(0), NodeId(1)).unwrap();
//! assert_eq!(flow.value, 5.0);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod validation;

pub use crate::algorithm::graph::*;
pub use crate::algorithm::traits::{Algorithm, AlgorithmError, AlgorithmId, EdgeId, NodeId};
pub use crate::data_structures::graph::{FlowGraph, Graph, Weight};
