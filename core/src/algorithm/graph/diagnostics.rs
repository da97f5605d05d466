//! Optional diagnostics for flow computations
//!
//! Solvers accept an explicit collector at construction time. Without one,
//! they skip every reporting call; with one, each discharge, relabel and
//! phase transition is forwarded to it.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::algorithm::graph::flow_network::{DistanceLabel, Flow};

/// Receiver for solver events
///
/// Vertices and arcs are reported by arena index within the network built
/// for the current invocation.
pub trait FlowDiagnostics {
    /// Flow moved along an arc
    fn record_discharge(&mut self, arc: usize, amount: Flow);

    /// A vertex label was raised
    fn record_relabel(&mut self, vertex: usize, old_label: DistanceLabel, new_label: DistanceLabel);

    /// The gap check lifted the source label and switched to draining excess back
    fn record_flow_back(&mut self, source_label: DistanceLabel) {
        let _ = source_label;
    }

    /// An augmenting path was applied (path-based solvers)
    fn record_augmentation(&mut self, path_length: usize, amount: Flow) {
        let _ = (path_length, amount);
    }
}

/// Flow algorithm performance counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Number of push operations
    pub push_operations: usize,
    /// Number of relabel operations
    pub relabel_operations: usize,
    /// Total label increase across all relabels
    pub label_increase: usize,
    /// Number of flow-back transitions
    pub flow_back_transitions: usize,
    /// Number of augmenting paths
    pub augmentations: usize,
    /// Total flow moved by pushes or augmentations
    pub flow_moved: Flow,
}

impl FlowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl FlowDiagnostics for FlowMetrics {
    fn record_discharge(&mut self, _arc: usize, amount: Flow) {
        self.push_operations += 1;
        self.flow_moved += amount;
    }

    fn record_relabel(&mut self, _vertex: usize, old_label: DistanceLabel, new_label: DistanceLabel) {
        self.relabel_operations += 1;
        self.label_increase += new_label.saturating_sub(old_label);
    }

    fn record_flow_back(&mut self, _source_label: DistanceLabel) {
        self.flow_back_transitions += 1;
    }

    fn record_augmentation(&mut self, _path_length: usize, amount: Flow) {
        self.augmentations += 1;
        self.flow_moved += amount;
    }
}
