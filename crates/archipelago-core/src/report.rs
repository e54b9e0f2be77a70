use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{Config, ReportConfig, Thresholds};
use crate::error::ValidationError;
use crate::graph::DependencyGraph;
use crate::layer::LayerPartition;
use crate::matrix::{self, IslandMatrix, IslandViolation, NodeMatrix};
use crate::metrics::{self, DegreeEntry};
use crate::types::{ArchitectureDefinition, EdgeClass, NodeId, Violation};
use crate::verdict::{DensityStatus, PropagationStatus, Verdict};

/// A node in matrix order with its owning island and degrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: NodeId,
    pub index: usize,
    pub island: String,
    pub in_degree: usize,
    pub out_degree: usize,
}

/// Health statistics for one island.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandStats {
    pub name: String,
    pub rank: usize,
    pub size: usize,
    pub members: Vec<NodeId>,
    /// First matrix index of the island's members.
    pub start: usize,
    /// One past the last matrix index of the island's members.
    pub end: usize,
    pub internal_edges: usize,
    pub outgoing_cross_edges: usize,
    pub incoming_cross_edges: usize,
    pub outgoing_violations: usize,
    /// More members than `report.island_size_limit`.
    pub oversized: bool,
}

/// Everything one analysis run computes. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub average_degree: f64,
    pub density: f64,
    pub density_status: DensityStatus,
    pub propagation_cost: f64,
    pub propagation_status: PropagationStatus,
    pub most_depended: Vec<DegreeEntry>,
    pub most_dependent: Vec<DegreeEntry>,
    pub nodes: Vec<NodeEntry>,
    pub islands: Vec<IslandStats>,
    pub cross_island_edges: usize,
    pub intra_island_edges: usize,
    /// Fraction of edges that stay inside their island, in [0, 1].
    pub insulation_rate: f64,
    pub violations: Vec<Violation>,
    pub island_violations: Vec<IslandViolation>,
    pub node_matrix: NodeMatrix,
    pub island_matrix: IslandMatrix,
    pub verdict: Verdict,
}

impl AnalysisReport {
    /// Derive the full report from a validated graph. Cannot fail.
    pub fn from_graph(
        graph: &DependencyGraph,
        thresholds: &Thresholds,
        options: &ReportConfig,
    ) -> Self {
        let coupling = metrics::compute(graph, options.top_n);
        let partition = LayerPartition::classify(graph);
        let node_matrix = NodeMatrix::build(graph, &partition);
        let island_matrix = IslandMatrix::build(graph, &partition);
        let island_violations = matrix::island_violations(graph, &partition);

        let verdict = Verdict::evaluate(
            coupling.density,
            coupling.propagation_cost,
            partition.violations().len(),
            thresholds,
        );
        debug!(%verdict, "assembled analysis report");

        Self {
            node_count: coupling.node_count,
            edge_count: coupling.edge_count,
            average_degree: coupling.average_degree,
            density: coupling.density,
            density_status: DensityStatus::of(coupling.density, thresholds),
            propagation_cost: coupling.propagation_cost,
            propagation_status: PropagationStatus::of(coupling.propagation_cost, thresholds),
            most_depended: coupling.most_depended,
            most_dependent: coupling.most_dependent,
            nodes: node_entries(graph),
            islands: island_stats(graph, &partition, options.island_size_limit),
            cross_island_edges: partition.cross_island_edge_count(),
            intra_island_edges: partition.intra_island_edge_count(),
            insulation_rate: partition.insulation_rate(),
            violations: partition.violations().to_vec(),
            island_violations,
            node_matrix,
            island_matrix,
            verdict,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Pass/fail policy applied by `archipelago check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckGate {
    /// Fail when the verdict is this or worse.
    pub fail_on: Verdict,
    /// Fail when there are more violations than this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_violations: Option<usize>,
}

impl Default for CheckGate {
    fn default() -> Self {
        Self {
            fail_on: Verdict::Warning,
            max_violations: None,
        }
    }
}

impl CheckGate {
    /// Reasons the report fails the gate; empty when it passes.
    pub fn failures(&self, report: &AnalysisReport) -> Vec<String> {
        let mut reasons = Vec::new();
        if report.verdict >= self.fail_on {
            reasons.push(format!(
                "verdict '{}' is at or above fail-on level '{}'",
                report.verdict, self.fail_on
            ));
        }
        if let Some(max) = self.max_violations {
            if report.violations.len() > max {
                reasons.push(format!(
                    "{} violation(s) exceed the limit of {max}",
                    report.violations.len()
                ));
            }
        }
        reasons
    }

    pub fn passes(&self, report: &AnalysisReport) -> bool {
        self.failures(report).is_empty()
    }
}

/// Validate a definition and analyze it.
#[instrument(skip_all, fields(islands = definition.islands.len(), edges = definition.edges.len()))]
pub fn analyze(
    definition: &ArchitectureDefinition,
    thresholds: &Thresholds,
    options: &ReportConfig,
) -> Result<AnalysisReport, ValidationError> {
    let graph = DependencyGraph::build(definition)?;
    Ok(AnalysisReport::from_graph(&graph, thresholds, options))
}

/// Analyze the definition carried by a loaded configuration.
pub fn analyze_config(config: &Config) -> Result<AnalysisReport, ValidationError> {
    analyze(&config.definition(), &config.thresholds, &config.report)
}

fn node_entries(graph: &DependencyGraph) -> Vec<NodeEntry> {
    graph
        .nodes()
        .enumerate()
        .map(|(index, node)| NodeEntry {
            id: node.id.clone(),
            index,
            island: graph.island_at(index).name.clone(),
            in_degree: graph.in_degree(index),
            out_degree: graph.out_degree(index),
        })
        .collect()
}

fn island_stats(
    graph: &DependencyGraph,
    partition: &LayerPartition,
    size_limit: usize,
) -> Vec<IslandStats> {
    let k = graph.island_count();
    let mut internal = vec![0usize; k];
    let mut outgoing = vec![0usize; k];
    let mut incoming = vec![0usize; k];
    let mut outgoing_violations = vec![0usize; k];

    for edge in partition.edges() {
        let from = partition.rank(edge.consumer);
        let to = partition.rank(edge.provider);
        match edge.class {
            EdgeClass::IntraLayer => internal[from] += 1,
            EdgeClass::CrossLayer | EdgeClass::Violation => {
                outgoing[from] += 1;
                incoming[to] += 1;
                if edge.class == EdgeClass::Violation {
                    outgoing_violations[from] += 1;
                }
            }
        }
    }

    let mut offset = 0usize;
    graph
        .islands()
        .iter()
        .map(|island| {
            let start = offset;
            offset += island.size();
            IslandStats {
                name: island.name.clone(),
                rank: island.rank,
                size: island.size(),
                members: island
                    .members
                    .iter()
                    .map(|&idx| graph.node(idx).id.clone())
                    .collect(),
                start,
                end: offset,
                internal_edges: internal[island.rank],
                outgoing_cross_edges: outgoing[island.rank],
                incoming_cross_edges: incoming[island.rank],
                outgoing_violations: outgoing_violations[island.rank],
                oversized: island.size() > size_limit,
            }
        })
        .collect()
}
