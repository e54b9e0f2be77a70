use archipelago_core::matrix::{IslandCell, NodeCell};
use archipelago_core::report::{AnalysisReport, CheckGate};

/// Format a full analysis report as Markdown.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("# Archipelago - Dependency Architecture Analysis\n\n");

    out.push_str(&format!(
        "**Verdict:** {} - {}\n",
        report.verdict.to_string().to_uppercase(),
        report.verdict.summary()
    ));

    // Statistics
    out.push_str("\n## Global Statistics\n\n");
    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    out.push_str(&format!("| Nodes | {} |\n", report.node_count));
    out.push_str(&format!("| Edges | {} |\n", report.edge_count));
    out.push_str(&format!("| Average degree | {:.2} |\n", report.average_degree));
    out.push_str(&format!("| Density | {:.4} |\n", report.density));
    out.push_str(&format!("| Propagation cost | {:.4} |\n", report.propagation_cost));
    out.push_str(&format!(
        "| Insulation rate | {:.1}% |\n",
        report.insulation_rate * 100.0
    ));

    // Hotspots
    out.push_str("\n## Coupling Hotspots\n\n");
    out.push_str("| Most depended upon | In | Most dependent | Out |\n");
    out.push_str("|--------------------|----|----------------|-----|\n");
    let rows = report.most_depended.len().max(report.most_dependent.len());
    for i in 0..rows {
        let (depended, in_degree) = report
            .most_depended
            .get(i)
            .map(|e| (format!("`{}`", e.node), e.degree.to_string()))
            .unwrap_or_default();
        let (dependent, out_degree) = report
            .most_dependent
            .get(i)
            .map(|e| (format!("`{}`", e.node), e.degree.to_string()))
            .unwrap_or_default();
        out.push_str(&format!(
            "| {depended} | {in_degree} | {dependent} | {out_degree} |\n"
        ));
    }

    // Islands
    out.push_str("\n## Islands\n\n");
    out.push_str("| Rank | Island | Nodes | Internal | Out | In | Back-edges |\n");
    out.push_str("|------|--------|-------|----------|-----|----|------------|\n");
    for island in &report.islands {
        let size = if island.oversized {
            format!("{} (oversized)", island.size)
        } else {
            island.size.to_string()
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            island.rank,
            island.name,
            size,
            island.internal_edges,
            island.outgoing_cross_edges,
            island.incoming_cross_edges,
            island.outgoing_violations
        ));
    }

    // Violations
    if report.is_clean() {
        out.push_str("\n## Layer Violations\n\nNo layer violations found.\n");
    } else {
        out.push_str(&format!(
            "\n## Layer Violations ({} found)\n\n",
            report.violations.len()
        ));
        out.push_str("| Consumer | Island | Provider | Island | Cell |\n");
        out.push_str("|----------|--------|----------|--------|------|\n");
        for v in &report.violations {
            out.push_str(&format!(
                "| `{}` | {} | `{}` | {} | ({}, {}) |\n",
                v.consumer, v.from_island, v.provider, v.to_island, v.row, v.col
            ));
        }
    }

    // Matrices
    out.push_str("\n## Dependency Structure Matrix\n\n");
    out.push_str("Rows depend on columns. `1` dependency, `X` violation, `o` self-reference.\n\n");
    out.push_str("```\n");
    for (row, node) in report.nodes.iter().enumerate() {
        let cells: String = (0..report.node_matrix.size)
            .map(|col| match report.node_matrix.get(row, col) {
                NodeCell::None => '.',
                NodeCell::Dependency => '1',
                NodeCell::Violation => 'X',
                NodeCell::SelfReference => 'o',
            })
            .collect();
        out.push_str(&format!("{row:>3} {cells}  {}\n", node.id));
    }
    out.push_str("```\n");

    out.push_str("\n## Island Matrix\n\n");
    out.push_str("| |");
    for island in &report.islands {
        out.push_str(&format!(" {} |", island.rank));
    }
    out.push('\n');
    out.push_str(&"|---".repeat(report.island_matrix.size + 1));
    out.push_str("|\n");
    for (row, island) in report.islands.iter().enumerate() {
        out.push_str(&format!("| **{}** {} |", row, island.name));
        for col in 0..report.island_matrix.size {
            let cell = match report.island_matrix.get(row, col) {
                IslandCell::None => "",
                IslandCell::Internal => "o",
                IslandCell::Dependency => "1",
                IslandCell::Violation => "**X**",
            };
            out.push_str(&format!(" {cell} |"));
        }
        out.push('\n');
    }

    if !report.island_violations.is_empty() {
        out.push_str("\n### Island Violations\n\n");
        for iv in &report.island_violations {
            out.push_str(&format!(
                "- **{}** -> **{}**: {} edge(s), e.g. `{}` -> `{}`\n",
                iv.from_island, iv.to_island, iv.edge_count, iv.example.0, iv.example.1
            ));
        }
    }

    out.push('\n');
    out
}

/// Format a check result as Markdown. Returns (markdown, passed).
pub fn format_check(report: &AnalysisReport, gate: &CheckGate) -> (String, bool) {
    let failures = gate.failures(report);
    let passed = failures.is_empty();

    let mut out = format_report(report);

    if passed {
        out.push_str("## Result\n\n**CHECK PASSED**\n");
    } else {
        out.push_str("## Result\n\n**CHECK FAILED**\n\n");
        for reason in &failures {
            out.push_str(&format!("- {reason}\n"));
        }
    }

    (out, passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archipelago_core::config::{ReportConfig, Thresholds};
    use archipelago_core::verdict::Verdict;
    use archipelago_core::{analyze, ArchitectureDefinition, EdgeSpec, IslandSpec};

    fn report(edges: &[(&str, &str)]) -> AnalysisReport {
        let def = ArchitectureDefinition {
            islands: vec![
                IslandSpec::new("Core", ["a"]),
                IslandSpec::new("Edge", ["b", "c"]),
            ],
            edges: edges.iter().map(|(c, p)| EdgeSpec::new(*c, *p)).collect(),
        };
        analyze(&def, &Thresholds::default(), &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_format_report_contains_statistics() {
        let md = format_report(&report(&[("b", "a")]));
        assert!(md.contains("| Nodes | 3 |"));
        assert!(md.contains("| Density | 0.1667 |"));
        assert!(md.contains("No layer violations found."));
        assert!(md.contains("| `a` | 1 | `b` | 1 |"));
    }

    #[test]
    fn test_format_report_matrices() {
        let md = format_report(&report(&[("a", "c"), ("b", "b")]));
        assert!(md.contains("  0 ..X  a"));
        assert!(md.contains("  1 .o.  b"));
        assert!(md.contains("| **0** Core |  | **X** |"));
        assert!(md.contains("- **Core** -> **Edge**: 1 edge(s), e.g. `a` -> `c`"));
    }

    #[test]
    fn test_format_check_passed() {
        let (md, passed) = format_check(&report(&[]), &CheckGate::default());
        assert!(passed);
        assert!(md.contains("CHECK PASSED"));
    }

    #[test]
    fn test_format_check_failed() {
        let gate = CheckGate {
            fail_on: Verdict::Caution,
            max_violations: None,
        };
        let (md, passed) = format_check(&report(&[("b", "a"), ("c", "a")]), &gate);
        assert!(!passed);
        assert!(md.contains("**CHECK FAILED**"));
        assert!(md.contains("- verdict 'warning' is at or above fail-on level 'caution'"));
    }
}
