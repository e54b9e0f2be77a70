use serde::Serialize;

use archipelago_core::report::{AnalysisReport, CheckGate};
use archipelago_core::verdict::Verdict;

/// Format a full analysis report as JSON.
pub fn format_report(report: &AnalysisReport, compact: bool) -> String {
    if compact {
        serde_json::to_string(report).expect("AnalysisReport should be serializable")
    } else {
        serde_json::to_string_pretty(report).expect("AnalysisReport should be serializable")
    }
}

/// Wrapper for check output that adds pass/fail metadata.
#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    #[serde(flatten)]
    pub report: &'a AnalysisReport,
    pub check: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub passed: bool,
    pub fail_on: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_violations: Option<usize>,
    pub failures: Vec<String>,
}

/// Format a check result as JSON. Returns (json_string, passed).
pub fn format_check(report: &AnalysisReport, gate: &CheckGate, compact: bool) -> (String, bool) {
    let failures = gate.failures(report);
    let passed = failures.is_empty();

    let output = CheckOutput {
        report,
        check: CheckStatus {
            passed,
            fail_on: gate.fail_on,
            max_violations: gate.max_violations,
            failures,
        },
    };

    let json = if compact {
        serde_json::to_string(&output).expect("CheckOutput should be serializable")
    } else {
        serde_json::to_string_pretty(&output).expect("CheckOutput should be serializable")
    };

    (json, passed)
}
