use thiserror::Error;

use crate::types::NodeId;

/// Structural problems in an architecture definition.
///
/// Raised once, while building a [`DependencyGraph`](crate::graph::DependencyGraph).
/// A graph that builds successfully can always be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no islands declared")]
    NoIslands,

    #[error("island '{0}' is declared more than once")]
    DuplicateIsland(String),

    #[error("node '{node}' is a member of both '{first_island}' and '{second_island}'")]
    DuplicateMembership {
        node: NodeId,
        first_island: String,
        second_island: String,
    },

    #[error("edge {consumer} -> {provider} references undeclared node '{missing}'")]
    UnknownNode {
        consumer: NodeId,
        provider: NodeId,
        missing: NodeId,
    },

    #[error("edge {consumer} -> {provider} is declared more than once")]
    DuplicateEdge { consumer: NodeId, provider: NodeId },
}
