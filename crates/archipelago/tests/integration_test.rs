use std::process::{Command, Output};

fn fixture_path(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/tests/fixtures/{name}")
}

fn archipelago_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_archipelago"));
    cmd.arg("--no-color");
    cmd
}

fn run(args: &[&str]) -> Output {
    archipelago_cmd()
        .args(args)
        .output()
        .expect("failed to run archipelago")
}

#[test]
fn test_analyze_clean_definition() {
    let output = run(&["analyze", &fixture_path("clean.toml")]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "archipelago analyze failed: stdout={stdout}, stderr={stderr}"
    );
    assert!(
        stdout.contains("Global Statistics"),
        "should contain statistics: {stdout}"
    );
    assert!(
        stdout.contains("No layer violations found!"),
        "should report no violations: {stdout}"
    );
    assert!(
        stdout.contains("Verdict: EXCELLENT"),
        "should be excellent: {stdout}"
    );
}

#[test]
fn test_analyze_reports_back_edge() {
    let output = run(&["analyze", &fixture_path("back-edge.toml")]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    // Violations alone do not fail analyze
    assert!(output.status.success(), "analyze should succeed: {stdout}");
    assert!(
        stdout.contains("Layer Violations (1 found)"),
        "should list the violation: {stdout}"
    );
    assert!(stdout.contains("[row 0, col 1]"), "should locate it: {stdout}");
    assert!(
        stdout.contains("Verdict: ACCEPTABLE"),
        "one back-edge is tolerated: {stdout}"
    );
}

#[test]
fn test_check_passes_with_default_gate() {
    let output = run(&["check", &fixture_path("back-edge.toml")]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "check should pass: {stdout}");
    assert!(stdout.contains("CHECK PASSED"), "should say CHECK PASSED: {stdout}");
}

#[test]
fn test_check_fails_on_max_violations() {
    let output = run(&[
        "check",
        &fixture_path("back-edge.toml"),
        "--max-violations",
        "0",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "expected exit code 1 for violations: {stdout}"
    );
    assert!(stdout.contains("CHECK FAILED"), "should say CHECK FAILED: {stdout}");
    assert!(
        stdout.contains("1 violation(s) exceed the limit of 0"),
        "should give the reason: {stdout}"
    );
}

#[test]
fn test_check_fails_on_verdict() {
    let output = run(&["check", &fixture_path("tangled.toml")]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "dense graph should fail: {stdout}");
    assert!(stdout.contains("Verdict: WARNING"), "should be a warning: {stdout}");

    let output = run(&[
        "check",
        &fixture_path("back-edge.toml"),
        "--fail-on",
        "acceptable",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_check_rejects_unknown_fail_on() {
    let output = run(&["check", &fixture_path("clean.toml"), "--fail-on", "fine"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("unknown verdict"), "stderr: {stderr}");
}

#[test]
fn test_unknown_node_is_a_validation_error() {
    let output = run(&["analyze", &fixture_path("unknown-node.toml")]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr.contains("undeclared node 'ghost'"),
        "should name the missing node: {stderr}"
    );
    assert!(output.stdout.is_empty(), "no partial report on error");
}

#[test]
fn test_missing_config_file() {
    let output = run(&["analyze", &fixture_path("does-not-exist.toml")]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("failed to read config file"), "stderr: {stderr}");
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archipelago_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago init");

    assert!(output.status.success(), "init should succeed");

    let config_path = dir.path().join("archipelago.toml");
    assert!(config_path.exists(), "archipelago.toml should be created");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        content.contains("[thresholds]"),
        "should contain [thresholds] section"
    );
    assert!(
        content.contains("[[islands]]"),
        "should contain island tables"
    );
}

#[test]
fn test_init_refuses_overwrite() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(dir.path().join("archipelago.toml"), "existing").unwrap();

    let output = archipelago_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago init");

    assert!(
        !output.status.success(),
        "init should fail when file exists"
    );
    let content = std::fs::read_to_string(dir.path().join("archipelago.toml")).unwrap();
    assert_eq!(content, "existing");

    let output = archipelago_cmd()
        .args(["init", "--force"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago init --force");
    assert!(output.status.success(), "--force should overwrite");
}

#[test]
fn test_analyze_discovers_config_in_current_dir() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let init = archipelago_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago init");
    assert!(init.status.success());

    let output = archipelago_cmd()
        .args(["analyze"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago analyze");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "analyze should succeed: {stdout}");
    assert!(stdout.contains("Nodes (N):          25"), "sample has 25 nodes: {stdout}");
    assert!(stdout.contains("Verdict: EXCELLENT"), "sample is excellent: {stdout}");
}

#[test]
fn test_analyze_without_config_names_the_missing_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archipelago_cmd()
        .args(["analyze"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago analyze");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr.contains("no archipelago.toml found"),
        "should say no config was found: {stderr}"
    );
    assert!(
        !stderr.contains("no islands declared"),
        "should not analyze an empty default: {stderr}"
    );
}

#[test]
fn test_analyze_reports_parse_error_of_discovered_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(dir.path().join("archipelago.toml"), "[[islands]]\nname = 3\n").unwrap();

    let output = archipelago_cmd()
        .args(["analyze"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archipelago analyze");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr.contains("failed to parse"),
        "should surface the parse failure: {stderr}"
    );
    assert!(
        stderr.contains("invalid type: integer `3`"),
        "should carry the TOML error: {stderr}"
    );
    assert!(
        !stderr.contains("no islands declared"),
        "should not fall back to defaults: {stderr}"
    );
}

#[test]
fn test_no_color_disables_ansi_in_logs() {
    let output = archipelago_cmd()
        .args(["analyze", &fixture_path("clean.toml")])
        .env("ARCHIPELAGO_LOG", "archipelago=debug")
        .output()
        .expect("failed to run archipelago analyze");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "analyze should succeed: {stderr}");
    assert!(
        stderr.contains("analysis complete"),
        "debug logging should be on: {stderr}"
    );
    assert!(!stderr.contains('\x1b'), "logs should be plain: {stderr}");
    assert!(!stdout.contains('\x1b'), "report should be plain: {stdout}");
}

#[test]
fn test_analyze_json_output() {
    let output = run(&[
        "analyze",
        &fixture_path("back-edge.toml"),
        "--format",
        "json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "analyze --format json should succeed: {stdout}"
    );

    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("output should be valid JSON");
    assert_eq!(parsed["node_count"], 6);
    assert_eq!(parsed["verdict"], "acceptable");
    assert_eq!(parsed["violations"][0]["provider"], "b");
    assert_eq!(parsed["island_matrix"]["cells"][0][1], "violation");
}

#[test]
fn test_analyze_json_compact() {
    let output = run(&[
        "analyze",
        &fixture_path("clean.toml"),
        "--format",
        "json",
        "--compact",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(stdout.trim().lines().count(), 1, "compact JSON is one line");
}

#[test]
fn test_check_json_output() {
    let output = run(&[
        "check",
        &fixture_path("tangled.toml"),
        "--format",
        "json",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("output should be valid JSON");
    assert_eq!(parsed["check"]["passed"], false);
    assert_eq!(parsed["check"]["fail_on"], "warning");
    assert_eq!(parsed["verdict"], "warning");
}

#[test]
fn test_analyze_markdown_output() {
    let output = run(&[
        "analyze",
        &fixture_path("back-edge.toml"),
        "--format",
        "markdown",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.starts_with("# Archipelago"), "markdown heading: {stdout}");
    assert!(stdout.contains("## Layer Violations (1 found)"));
}
