use std::collections::BTreeSet;

use colored::{ColoredString, Colorize};

use archipelago_core::matrix::{IslandCell, NodeCell};
use archipelago_core::metrics::DegreeEntry;
use archipelago_core::report::{AnalysisReport, CheckGate};
use archipelago_core::verdict::{DensityStatus, PropagationStatus, Verdict};

/// Format a full analysis report for terminal output.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    // Header
    let title = "Archipelago - Dependency Architecture Analysis";
    out.push_str(&format!("\n{}\n", title.bold()));
    out.push_str(&format!("{}\n", "=".repeat(48)));

    out.push_str(&format_statistics(report));
    out.push_str(&format_rankings(report));
    out.push_str(&format_islands(report));
    out.push_str(&format_violations(report));
    out.push_str(&format_node_matrix(report));
    out.push_str(&format_node_index(report));
    out.push_str(&format_island_matrix(report));
    out.push_str(&format_island_violations(report));
    out.push_str(&format_verdict(report));

    out.push('\n');
    out
}

fn section(title: &str) -> String {
    format!("\n{}\n{}\n", title.bold(), "-".repeat(48))
}

fn format_statistics(report: &AnalysisReport) -> String {
    let mut out = section("Global Statistics");

    let density_label = match report.density_status {
        DensityStatus::Ok => "[OK]".green(),
        DensityStatus::Elevated => "[ELEVATED]".yellow(),
        DensityStatus::High => "[HIGH]".red(),
    };
    let propagation_label = match report.propagation_status {
        PropagationStatus::Ok => "[OK]".green(),
        PropagationStatus::Moderate => "[MODERATE]".yellow(),
    };

    out.push_str(&format!("  Nodes (N):          {}\n", report.node_count));
    out.push_str(&format!("  Edges (E):          {}\n", report.edge_count));
    out.push_str(&format!("  Average degree:     {:.2}\n", report.average_degree));
    out.push_str(&format!(
        "  Density (D):        {:.4}  {}\n",
        report.density, density_label
    ));
    out.push_str(&format!(
        "  Propagation cost:   {:.4}  {}\n",
        report.propagation_cost, propagation_label
    ));
    out
}

fn format_rankings(report: &AnalysisReport) -> String {
    let mut out = section("Coupling Hotspots");

    out.push_str("  Most depended upon (in-degree):\n");
    out.push_str(&format_ranking(&report.most_depended, "<-"));
    out.push_str("  Most dependent (out-degree):\n");
    out.push_str(&format_ranking(&report.most_dependent, "->"));
    out
}

fn format_ranking(entries: &[DegreeEntry], arrow: &str) -> String {
    if entries.is_empty() {
        return "    (none)\n".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "    {}. {:<32} {arrow} {}\n",
                i + 1,
                entry.node.as_str(),
                entry.degree
            )
        })
        .collect()
}

fn format_islands(report: &AnalysisReport) -> String {
    let mut out = section("Islands");

    for island in &report.islands {
        let health = if island.oversized {
            "[OVERSIZED]".yellow()
        } else {
            "[OK]".green()
        };
        let span = if island.size == 0 {
            "empty".to_string()
        } else {
            format!("#{}-#{}", island.start, island.end - 1)
        };
        out.push_str(&format!(
            "  [{}] {:<24} {:>3} node(s)  {:<10} {}\n",
            island.rank, island.name, island.size, span, health
        ));
        out.push_str(&format!(
            "      internal: {}  out: {}  in: {}  back-edges: {}\n",
            island.internal_edges,
            island.outgoing_cross_edges,
            island.incoming_cross_edges,
            island.outgoing_violations
        ));
    }

    out.push_str(&format!("\n  {}\n", "Insulation".bold()));
    out.push_str(&format!(
        "    Cross-island edges:  {} / {}\n",
        report.cross_island_edges, report.edge_count
    ));
    out.push_str(&format!(
        "    Intra-island edges:  {} / {}\n",
        report.intra_island_edges, report.edge_count
    ));
    out.push_str(&format!(
        "    Insulation rate:     {:.1}%\n",
        report.insulation_rate * 100.0
    ));
    out
}

fn format_violations(report: &AnalysisReport) -> String {
    if report.is_clean() {
        return format!(
            "\n{}\n",
            "No layer violations found!".green().bold()
        );
    }

    let mut out = format!(
        "\n{} ({} found)\n{}\n",
        "Layer Violations".red().bold(),
        report.violations.len(),
        "-".repeat(48),
    );
    for v in &report.violations {
        out.push_str(&format!(
            "  {} {} ({})\n",
            "X".red().bold(),
            v.consumer,
            v.from_island
        ));
        out.push_str(&format!("      -> {} ({})\n", v.provider, v.to_island));
        out.push_str(&format!("      [row {}, col {}]\n", v.row, v.col));
    }
    out
}

fn node_symbol(cell: NodeCell) -> ColoredString {
    match cell {
        NodeCell::None => ".".dimmed(),
        NodeCell::Dependency => "1".normal(),
        NodeCell::Violation => "X".red().bold(),
        NodeCell::SelfReference => "o".cyan(),
    }
}

fn island_symbol(cell: IslandCell) -> ColoredString {
    match cell {
        IslandCell::None => ".".dimmed(),
        IslandCell::Internal => "o".cyan(),
        IslandCell::Dependency => "1".normal(),
        IslandCell::Violation => "X".red().bold(),
    }
}

fn column_header(size: usize) -> String {
    let mut out = String::new();
    if size > 10 {
        out.push_str("      ");
        for col in 0..size {
            out.push_str(&format!(" {} ", col / 10));
        }
        out.push('\n');
    }
    out.push_str("      ");
    for col in 0..size {
        out.push_str(&format!(" {} ", col % 10));
    }
    out.push_str("  provider ->\n");
    out
}

/// Node DSM with island boundaries drawn as `=` rows and `|` columns.
fn format_node_matrix(report: &AnalysisReport) -> String {
    let mut out = section("Dependency Structure Matrix (rows depend on columns)");
    let n = report.node_matrix.size;
    if n == 0 {
        out.push_str("  (no nodes)\n");
        return out;
    }

    // Indices at which a new island starts
    let boundaries: BTreeSet<usize> = report
        .islands
        .iter()
        .map(|island| island.end)
        .filter(|&end| end > 0 && end < n)
        .collect();

    out.push_str(&column_header(n));
    out.push_str(&format!("     +{}\n", "---".repeat(n)));

    for (row, entry) in report.nodes.iter().enumerate() {
        if boundaries.contains(&row) {
            out.push_str(&format!("     +{}\n", "===".repeat(n)));
        }
        out.push_str(&format!(" {row:>3} |"));
        for col in 0..n {
            let edge = if boundaries.contains(&(col + 1)) { '|' } else { ' ' };
            out.push_str(&format!(" {}{edge}", node_symbol(report.node_matrix.get(row, col))));
        }
        out.push_str(&format!("  {}\n", entry.id));
    }

    out.push_str(&format!(
        "\n  {}  1 = dependency  {} = violation  {} = self-reference\n",
        "Legend:".dimmed(),
        "X".red().bold(),
        "o".cyan()
    ));
    out
}

fn format_node_index(report: &AnalysisReport) -> String {
    let mut out = section("Node Index");
    out.push_str(&format!(
        "  {:>4}  {:<32} {:<24} {:>3} {:>4}\n",
        "No.", "Node", "Island", "In", "Out"
    ));
    for node in &report.nodes {
        out.push_str(&format!(
            "  {:>4}  {:<32} {:<24} {:>3} {:>4}\n",
            node.index,
            node.id.as_str(),
            node.island,
            node.in_degree,
            node.out_degree
        ));
    }
    out
}

fn format_island_matrix(report: &AnalysisReport) -> String {
    let mut out = section("Island Matrix (rows depend on columns)");
    let k = report.island_matrix.size;

    out.push_str(&column_header(k));
    out.push_str(&format!("     +{}\n", "---".repeat(k)));
    for (row, island) in report.islands.iter().enumerate() {
        out.push_str(&format!(" {row:>3} |"));
        for col in 0..k {
            out.push_str(&format!(" {} ", island_symbol(report.island_matrix.get(row, col))));
        }
        out.push_str(&format!("  {}\n", island.name));
    }
    out
}

fn format_island_violations(report: &AnalysisReport) -> String {
    if report.island_violations.is_empty() {
        return String::new();
    }

    let mut out = section("Island Violations");
    for iv in &report.island_violations {
        out.push_str(&format!("  [{}] {}\n", iv.row, iv.from_island));
        out.push_str(&format!(
            "    --{}--> [{}] {}\n",
            "X".red().bold(),
            iv.col,
            iv.to_island
        ));
        out.push_str(&format!(
            "         e.g. {} -> {} ({} edge(s))\n",
            iv.example.0, iv.example.1, iv.edge_count
        ));
    }
    out
}

fn verdict_label(verdict: Verdict) -> ColoredString {
    let label = verdict.to_string().to_uppercase();
    match verdict {
        Verdict::Excellent => label.green().bold(),
        Verdict::Acceptable => label.green(),
        Verdict::Caution => label.yellow().bold(),
        Verdict::Warning => label.red().bold(),
    }
}

fn format_verdict(report: &AnalysisReport) -> String {
    let mut out = format!("\n{}\n", "=".repeat(48));
    out.push_str(&format!("{}: {}\n", "Verdict".bold(), verdict_label(report.verdict)));
    out.push_str(&format!("  {}\n", report.verdict.summary()));
    if report.verdict == Verdict::Acceptable && !report.violations.is_empty() {
        out.push_str(&format!("  {} minor back-edge(s) remain.\n", report.violations.len()));
    }
    out.push_str(&format!("{}\n", "=".repeat(48)));
    out
}

/// Format a check result for CI use. Returns (text, passed).
pub fn format_check(report: &AnalysisReport, gate: &CheckGate) -> (String, bool) {
    let failures = gate.failures(report);
    let passed = failures.is_empty();

    let mut out = format_report(report);

    if passed {
        out.push_str(&format!("{}\n", "CHECK PASSED".green().bold()));
    } else {
        out.push_str(&format!("{}\n", "CHECK FAILED".red().bold()));
        for reason in &failures {
            out.push_str(&format!("  - {reason}\n"));
        }
    }

    (out, passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archipelago_core::config::{Config, ReportConfig, Thresholds};
    use archipelago_core::{analyze, ArchitectureDefinition, EdgeSpec, IslandSpec};

    fn report(edges: &[(&str, &str)]) -> AnalysisReport {
        colored::control::set_override(false);
        let def = ArchitectureDefinition {
            islands: vec![
                IslandSpec::new("Core", ["a", "b"]),
                IslandSpec::new("Edge", ["c"]),
            ],
            edges: edges.iter().map(|(c, p)| EdgeSpec::new(*c, *p)).collect(),
        };
        analyze(&def, &Thresholds::default(), &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_format_report_sections() {
        let text = format_report(&report(&[("c", "a"), ("b", "a")]));
        assert!(text.contains("Global Statistics"));
        assert!(text.contains("Nodes (N):          3"));
        assert!(text.contains("Insulation rate:     50.0%"));
        assert!(text.contains("No layer violations found!"));
        assert!(text.contains("Verdict: WARNING"));
    }

    #[test]
    fn test_matrix_draws_island_boundaries() {
        let text = format_report(&report(&[("a", "c"), ("b", "b")]));
        // Row 0: a -> c crosses the boundary after column 1
        assert!(text.contains("   0 | .  .| X   a"));
        assert!(text.contains("   1 | .  o| .   b"));
        assert!(text.contains("     +========="));
    }

    #[test]
    fn test_violation_details() {
        let text = format_report(&report(&[("a", "c")]));
        assert!(text.contains("Layer Violations (1 found)"));
        assert!(text.contains("-> c (Edge)"));
        assert!(text.contains("[row 0, col 2]"));
        assert!(text.contains("e.g. a -> c (1 edge(s))"));
    }

    #[test]
    fn test_sample_report_renders_excellent() {
        colored::control::set_override(false);
        let config = Config::parse(&Config::default_toml()).unwrap();
        let report = archipelago_core::analyze_config(&config).unwrap();
        let text = format_report(&report);
        assert!(text.contains("Verdict: EXCELLENT"));
        assert!(text.contains("1. auth.users"));
        assert!(text.contains("[7] Recruitment"));
        assert!(!text.contains("[OVERSIZED]"));
    }

    #[test]
    fn test_format_check_pass_and_fail() {
        let clean = report(&[]);
        let (out, passed) = format_check(&clean, &CheckGate::default());
        assert!(passed);
        assert!(out.contains("CHECK PASSED"));

        let dirty = report(&[("a", "c")]);
        let gate = CheckGate {
            fail_on: Verdict::Warning,
            max_violations: Some(0),
        };
        let (out, passed) = format_check(&dirty, &gate);
        assert!(!passed);
        assert!(out.contains("CHECK FAILED"));
        assert!(out.contains("1 violation(s) exceed the limit of 0"));
    }
}
