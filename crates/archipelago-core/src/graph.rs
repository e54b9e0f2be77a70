use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::types::{ArchitectureDefinition, NodeId};

/// Node in the dependency graph. Its position in [`DependencyGraph::nodes`]
/// is its matrix index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    /// Rank of the owning island.
    pub island: usize,
}

/// A declared island after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island {
    pub name: String,
    /// Position in the declared island order. 0 is the most foundational.
    pub rank: usize,
    /// Matrix indices of the members, in membership order.
    pub members: Vec<usize>,
}

impl Island {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Edge by matrix index: `consumer` depends on `provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub consumer: usize,
    pub provider: usize,
}

/// Validated, immutable directed graph of island members.
///
/// Nodes are laid out in island declaration order, then membership order,
/// so a node's petgraph index doubles as its row/column in every matrix.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<NodeId, NodeIndex>,
    islands: Vec<Island>,
    edges: Vec<GraphEdge>,
}

impl DependencyGraph {
    /// Build and validate a graph from its declarative definition.
    pub fn build(definition: &ArchitectureDefinition) -> Result<Self, ValidationError> {
        if definition.islands.is_empty() {
            return Err(ValidationError::NoIslands);
        }

        let mut graph = DiGraph::new();
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut islands: Vec<Island> = Vec::with_capacity(definition.islands.len());
        let mut island_names: HashSet<&str> = HashSet::new();

        for (rank, spec) in definition.islands.iter().enumerate() {
            if !island_names.insert(spec.name.as_str()) {
                return Err(ValidationError::DuplicateIsland(spec.name.clone()));
            }

            let mut members = Vec::with_capacity(spec.members.len());
            for member in &spec.members {
                if let Some(&existing) = index.get(member) {
                    let first: &GraphNode = &graph[existing];
                    let first_island = islands
                        .get(first.island)
                        .map_or_else(|| spec.name.clone(), |i: &Island| i.name.clone());
                    return Err(ValidationError::DuplicateMembership {
                        node: member.clone(),
                        first_island,
                        second_island: spec.name.clone(),
                    });
                }
                let idx = graph.add_node(GraphNode {
                    id: member.clone(),
                    island: rank,
                });
                index.insert(member.clone(), idx);
                members.push(idx.index());
            }

            islands.push(Island {
                name: spec.name.clone(),
                rank,
                members,
            });
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut edges = Vec::with_capacity(definition.edges.len());
        for spec in &definition.edges {
            let lookup = |id: &NodeId| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| ValidationError::UnknownNode {
                        consumer: spec.consumer.clone(),
                        provider: spec.provider.clone(),
                        missing: id.clone(),
                    })
            };
            let consumer = lookup(&spec.consumer)?;
            let provider = lookup(&spec.provider)?;

            if !seen.insert((consumer.index(), provider.index())) {
                return Err(ValidationError::DuplicateEdge {
                    consumer: spec.consumer.clone(),
                    provider: spec.provider.clone(),
                });
            }

            graph.add_edge(consumer, provider, ());
            edges.push(GraphEdge {
                consumer: consumer.index(),
                provider: provider.index(),
            });
        }

        debug!(
            nodes = graph.node_count(),
            edges = edges.len(),
            islands = islands.len(),
            "built dependency graph"
        );

        Ok(Self {
            graph,
            index,
            islands,
            edges,
        })
    }

    /// Total node count (N).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Total edge count (E), self-edges included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    /// Nodes in matrix order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_weights()
    }

    /// Node at a matrix index.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= node_count()`.
    pub fn node(&self, idx: usize) -> &GraphNode {
        &self.graph[NodeIndex::new(idx)]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).map(|idx| idx.index())
    }

    pub fn island_of(&self, id: &NodeId) -> Option<&Island> {
        self.index
            .get(id)
            .map(|&idx| &self.islands[self.graph[idx].island])
    }

    /// Islands in declared (rank) order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Island owning the node at a matrix index.
    pub fn island_at(&self, idx: usize) -> &Island {
        &self.islands[self.node(idx).island]
    }

    /// Edges in input order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Number of edges where the node is the provider.
    pub fn in_degree(&self, idx: usize) -> usize {
        self.edges.iter().filter(|e| e.provider == idx).count()
    }

    /// Number of edges where the node is the consumer.
    pub fn out_degree(&self, idx: usize) -> usize {
        self.edges.iter().filter(|e| e.consumer == idx).count()
    }

    pub(crate) fn inner(&self) -> &DiGraph<GraphNode, ()> {
        &self.graph
    }
}
