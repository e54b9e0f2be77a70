use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::layer::{ClassifiedEdge, LayerPartition};
use crate::types::{EdgeClass, NodeId, Violation};

/// Cell of the node-level dependency structure matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCell {
    #[default]
    None,
    Dependency,
    Violation,
    SelfReference,
}

impl NodeCell {
    fn for_edge(edge: &ClassifiedEdge) -> Self {
        if edge.is_self_edge() {
            NodeCell::SelfReference
        } else if edge.class == EdgeClass::Violation {
            NodeCell::Violation
        } else {
            NodeCell::Dependency
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, NodeCell::None)
    }
}

/// N x N matrix, rows = consumer, columns = provider, in graph node order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMatrix {
    pub size: usize,
    pub cells: Vec<Vec<NodeCell>>,
}

impl NodeMatrix {
    /// Place every classified edge of the partition.
    pub fn build(graph: &DependencyGraph, partition: &LayerPartition) -> Self {
        Self::from_placements(
            graph.node_count(),
            partition
                .edges()
                .iter()
                .map(|e| (e.consumer, e.provider, NodeCell::for_edge(e))),
        )
    }

    /// Rebuild from a violation list plus the remaining (non-violating) edges.
    pub fn from_classified<'a>(
        size: usize,
        violations: &[Violation],
        others: impl IntoIterator<Item = &'a ClassifiedEdge>,
    ) -> Self {
        let placed_violations = violations
            .iter()
            .map(|v| (v.row, v.col, NodeCell::Violation));
        let placed_others = others
            .into_iter()
            .map(|e| (e.consumer, e.provider, NodeCell::for_edge(e)));
        Self::from_placements(size, placed_violations.chain(placed_others))
    }

    pub fn from_placements(
        size: usize,
        placements: impl IntoIterator<Item = (usize, usize, NodeCell)>,
    ) -> Self {
        let mut cells = vec![vec![NodeCell::None; size]; size];
        for (row, col, cell) in placements {
            cells[row][col] = cell;
        }
        Self { size, cells }
    }

    pub fn get(&self, row: usize, col: usize) -> NodeCell {
        self.cells[row][col]
    }

    /// Number of non-empty cells.
    pub fn filled(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| !c.is_none())
            .count()
    }

    pub fn count(&self, cell: NodeCell) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == cell).count()
    }
}

/// Cell of the island-level matrix.
///
/// Variants are ordered by severity so aggregation is a `max`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum IslandCell {
    #[default]
    None,
    /// Diagonal: at least one edge inside the island.
    #[serde(rename = "self")]
    Internal,
    Dependency,
    Violation,
}

/// K x K matrix, rows = consumer island, columns = provider island, in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandMatrix {
    pub size: usize,
    pub cells: Vec<Vec<IslandCell>>,
    /// Edge count per island pair.
    pub edge_counts: Vec<Vec<usize>>,
}

impl IslandMatrix {
    pub fn build(graph: &DependencyGraph, partition: &LayerPartition) -> Self {
        let size = graph.island_count();
        let mut cells = vec![vec![IslandCell::None; size]; size];
        let mut edge_counts = vec![vec![0usize; size]; size];

        for edge in partition.edges() {
            let row = partition.rank(edge.consumer);
            let col = partition.rank(edge.provider);
            let cell = match edge.class {
                EdgeClass::IntraLayer => IslandCell::Internal,
                EdgeClass::CrossLayer => IslandCell::Dependency,
                EdgeClass::Violation => IslandCell::Violation,
            };
            // Only ever upgrade severity
            cells[row][col] = cells[row][col].max(cell);
            edge_counts[row][col] += 1;
        }

        Self {
            size,
            cells,
            edge_counts,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> IslandCell {
        self.cells[row][col]
    }

    pub fn edge_count(&self, row: usize, col: usize) -> usize {
        self.edge_counts[row][col]
    }
}

/// All violations between one pair of islands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandViolation {
    pub from_island: String,
    pub to_island: String,
    /// Island matrix row (consumer island rank).
    pub row: usize,
    /// Island matrix column (provider island rank).
    pub col: usize,
    pub edge_count: usize,
    /// First violating edge of the pair, in input order.
    pub example: (NodeId, NodeId),
}

/// Group node-level violations by island pair, ordered by (row, col).
pub fn island_violations(
    graph: &DependencyGraph,
    partition: &LayerPartition,
) -> Vec<IslandViolation> {
    let mut grouped: BTreeMap<(usize, usize), IslandViolation> = BTreeMap::new();

    for v in partition.violations() {
        let row = partition.rank(v.row);
        let col = partition.rank(v.col);
        grouped
            .entry((row, col))
            .and_modify(|iv| iv.edge_count += 1)
            .or_insert_with(|| IslandViolation {
                from_island: graph.islands()[row].name.clone(),
                to_island: graph.islands()[col].name.clone(),
                row,
                col,
                edge_count: 1,
                example: (v.consumer.clone(), v.provider.clone()),
            });
    }

    debug!(pairs = grouped.len(), "grouped island violations");
    grouped.into_values().collect()
}
