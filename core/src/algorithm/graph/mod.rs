//! Maximum flow and minimum cut over generic graph views
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod diagnostics;
pub mod edmonds_karp;
pub mod extension;
pub mod flow_network;
pub mod flow_result;
pub mod max_flow;

pub use self::diagnostics::{FlowDiagnostics, FlowMetrics};
pub use self::edmonds_karp::EdmondsKarpSolver;
pub use self::extension::ExtensionManager;
pub use self::flow_network::{
    AnnotatedEdge, ArcKey, Capacity, DistanceLabel, Flow, FlowConfig, FlowError, FlowNetwork, VertexExtension,
    DEFAULT_EPSILON,
};
pub use self::flow_result::{MaximumFlow, MinimumCut};
pub use self::max_flow::{MaximumFlowAlgorithm, PushRelabelSolver};
