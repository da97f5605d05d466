//! Graph storage and the capability interface consumed by algorithms

pub mod graph;

pub use self::graph::{Edge, FlowGraph, Graph, Weight};
