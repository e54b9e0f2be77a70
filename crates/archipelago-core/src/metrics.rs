use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::types::NodeId;

/// One entry in a degree ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeEntry {
    pub node: NodeId,
    /// Matrix index of the node.
    pub index: usize,
    pub degree: usize,
}

/// Global coupling metrics of a dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    /// `2E / N`: average number of connections per node.
    pub average_degree: f64,
    /// `E / (N * (N - 1))`, 0 for N <= 1.
    pub density: f64,
    /// Density of the transitive closure, reflexive pairs excluded.
    pub propagation_cost: f64,
    /// Nodes with the highest in-degree (most depended upon).
    pub most_depended: Vec<DegreeEntry>,
    /// Nodes with the highest out-degree (most dependent).
    pub most_dependent: Vec<DegreeEntry>,
}

/// Which side of an edge a degree ranking counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeKind {
    In,
    Out,
}

/// Compute all coupling metrics, keeping the top `top_n` of each ranking.
pub fn compute(graph: &DependencyGraph, top_n: usize) -> CouplingMetrics {
    let n = graph.node_count();
    let e = graph.edge_count();

    let metrics = CouplingMetrics {
        node_count: n,
        edge_count: e,
        average_degree: average_degree(n, e),
        density: density(n, e),
        propagation_cost: propagation_cost(graph),
        most_depended: rank_by_degree(graph, DegreeKind::In, top_n),
        most_dependent: rank_by_degree(graph, DegreeKind::Out, top_n),
    };

    debug!(
        density = metrics.density,
        propagation_cost = metrics.propagation_cost,
        "computed coupling metrics"
    );

    metrics
}

/// Directed graph density. Self-edges count toward `edge_count` while the
/// denominator excludes self-pairs.
pub fn density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    edge_count as f64 / ordered_pairs(node_count) as f64
}

pub fn average_degree(node_count: usize, edge_count: usize) -> f64 {
    if node_count == 0 {
        return 0.0;
    }
    (2 * edge_count) as f64 / node_count as f64
}

/// Fraction of ordered pairs (u, v), u != v, where v is reachable from u.
pub fn propagation_cost(graph: &DependencyGraph) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }
    reachable_pairs(graph) as f64 / ordered_pairs(n) as f64
}

/// Count ordered pairs (u, v), u != v, joined by a directed path.
///
/// One BFS per node: O(N * (N + E)).
pub fn reachable_pairs(graph: &DependencyGraph) -> usize {
    let inner = graph.inner();
    let mut total = 0usize;

    for start in inner.node_indices() {
        let mut bfs = Bfs::new(inner, start);
        while let Some(visited) = bfs.next(inner) {
            if visited != start {
                total += 1;
            }
        }
    }

    total
}

/// Rank nodes by degree, descending. Ties keep matrix order.
pub fn rank_by_degree(graph: &DependencyGraph, kind: DegreeKind, top_n: usize) -> Vec<DegreeEntry> {
    let mut entries: Vec<DegreeEntry> = graph
        .nodes()
        .enumerate()
        .map(|(index, node)| DegreeEntry {
            node: node.id.clone(),
            index,
            degree: match kind {
                DegreeKind::In => graph.in_degree(index),
                DegreeKind::Out => graph.out_degree(index),
            },
        })
        .collect();

    // sort_by is stable, so equal degrees stay in matrix order
    entries.sort_by(|a, b| b.degree.cmp(&a.degree));
    entries.truncate(top_n);
    entries
}

fn ordered_pairs(node_count: usize) -> usize {
    node_count * (node_count - 1)
}
