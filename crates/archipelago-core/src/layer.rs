use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::types::{EdgeClass, Violation};

/// An edge with its layering classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEdge {
    pub consumer: usize,
    pub provider: usize,
    pub class: EdgeClass,
}

impl ClassifiedEdge {
    pub fn is_self_edge(&self) -> bool {
        self.consumer == self.provider
    }
}

/// Layer ranks for every node and a classification for every edge.
///
/// Built in one pass over the edge list. Edge order, and therefore
/// violation order, follows the input.
#[derive(Debug, Clone)]
pub struct LayerPartition {
    ranks: Vec<usize>,
    edges: Vec<ClassifiedEdge>,
    violations: Vec<Violation>,
    cross_island_edges: usize,
}

impl LayerPartition {
    pub fn classify(graph: &DependencyGraph) -> Self {
        let ranks: Vec<usize> = graph.nodes().map(|n| n.island).collect();
        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut violations = Vec::new();
        let mut cross_island_edges = 0usize;

        for edge in graph.edges() {
            let class = EdgeClass::from_ranks(ranks[edge.consumer], ranks[edge.provider]);

            if class.crosses_islands() {
                cross_island_edges += 1;
            }

            if class == EdgeClass::Violation {
                violations.push(Violation {
                    consumer: graph.node(edge.consumer).id.clone(),
                    provider: graph.node(edge.provider).id.clone(),
                    from_island: graph.island_at(edge.consumer).name.clone(),
                    to_island: graph.island_at(edge.provider).name.clone(),
                    row: edge.consumer,
                    col: edge.provider,
                });
            }

            edges.push(ClassifiedEdge {
                consumer: edge.consumer,
                provider: edge.provider,
                class,
            });
        }

        debug!(
            cross_island = cross_island_edges,
            violations = violations.len(),
            "classified edges"
        );

        Self {
            ranks,
            edges,
            violations,
            cross_island_edges,
        }
    }

    /// Layer rank of the node at a matrix index.
    pub fn rank(&self, idx: usize) -> usize {
        self.ranks[idx]
    }

    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Every edge, in input order, with its classification.
    pub fn edges(&self) -> &[ClassifiedEdge] {
        &self.edges
    }

    pub fn edges_of(&self, class: EdgeClass) -> impl Iterator<Item = &ClassifiedEdge> + '_ {
        self.edges.iter().filter(move |e| e.class == class)
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn cross_island_edge_count(&self) -> usize {
        self.cross_island_edges
    }

    pub fn intra_island_edge_count(&self) -> usize {
        self.edges.len() - self.cross_island_edges
    }

    /// Fraction of edges that stay inside their island.
    pub fn insulation_rate(&self) -> f64 {
        insulation_rate(self.cross_island_edges, self.edges.len())
    }
}

/// `1 - cross / total`, defined as 1 when there are no edges.
pub fn insulation_rate(cross_island_edges: usize, total_edges: usize) -> f64 {
    if total_edges == 0 {
        return 1.0;
    }
    1.0 - cross_island_edges as f64 / total_edges as f64
}
