//! Dependency-architecture analysis over islands of nodes.
//!
//! An [`ArchitectureDefinition`] lists islands (layers) from the most
//! foundational to the most peripheral, plus `consumer -> provider` edges.
//! [`DependencyGraph::build`] validates it once; everything after that is a
//! pure derivation ending in an immutable [`AnalysisReport`].

pub mod config;
pub mod error;
pub mod graph;
pub mod layer;
pub mod matrix;
pub mod metrics;
pub mod report;
pub mod types;
pub mod verdict;

pub use config::Config;
pub use error::ValidationError;
pub use graph::DependencyGraph;
pub use layer::LayerPartition;
pub use matrix::{IslandCell, IslandMatrix, NodeCell, NodeMatrix};
pub use report::{analyze, analyze_config, AnalysisReport, CheckGate};
pub use types::*;
pub use verdict::Verdict;
