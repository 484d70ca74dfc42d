//! Integration tests for the CLI interface

use assert_cmd::Command;
use predicates::prelude::*;
use sitreps::testing::fixtures::{SAMPLE_OVERRIDE_YAML, SAMPLE_SETTINGS_YAML};
use sitreps::testing::TestContext;

fn sitreps() -> Command {
    let mut cmd = Command::cargo_bin("sitreps").unwrap();
    for var in [
        "SITREPS_LOG_LEVEL",
        "SITREPS_JIRA_URL",
        "SITREPS_JIRA_TOKEN",
        "SITREPS_SONARQUBE_URL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_help_flag() {
    sitreps()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn test_missing_subcommand() {
    sitreps()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_validate_reports_services() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();

    sitreps()
        .arg("validate")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("jira: enabled, 3 filters, no credentials"))
        .stdout(predicate::str::contains("jenkins: enabled, 0 filters, credentials set"))
        .stdout(predicate::str::contains("sonarqube: disabled"))
        .stdout(predicate::str::contains("repo Frontend: acme/frontend (github, main)"));
}

#[test]
fn test_validate_with_override() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();
    let project = ctx.write_file("project.yaml", SAMPLE_OVERRIDE_YAML).unwrap();

    sitreps()
        .args(["validate", "-c"])
        .arg(&config)
        .arg("--override")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("jira: enabled, 4 filters"));
}

#[test]
fn test_validate_invalid_settings_exit_code() {
    let ctx = TestContext::new().unwrap();
    let config = ctx
        .write_file("settings.yaml", "max_concurrency: 0\nlog_level: loud\n")
        .unwrap();

    sitreps()
        .args(["validate", "-c"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration problem"))
        .stderr(predicate::str::contains("max_concurrency"))
        .stderr(predicate::str::contains("log_level"));
}

#[test]
fn test_validate_missing_file() {
    sitreps()
        .args(["validate", "-c", "/nonexistent/settings.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_resolve_all_filters() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();

    sitreps()
        .args(["resolve", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "unresolved\t(project = \"FOO\" AND type = Bug) AND (resolution = Unresolved)",
        ))
        .stdout(predicate::str::contains("resolved\t"))
        .stdout(predicate::str::contains("blocker\t"));
}

#[test]
fn test_resolve_with_param_override() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();

    sitreps()
        .args(["resolve", "-c"])
        .arg(&config)
        .args(["-p", "project=BAR", "blocker"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "blocker\t(project = \"BAR\" AND type = Bug) AND (priority = Blocker AND resolution = Unresolved)",
        ))
        .stdout(predicate::str::contains("unresolved").not());
}

#[test]
fn test_resolve_unknown_filter_is_reported() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();

    sitreps()
        .args(["resolve", "-c"])
        .arg(&config)
        .args(["resolved", "missing_filter"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("resolved\t"))
        .stderr(predicate::str::contains("unknown filter 'missing_filter'"))
        .stderr(predicate::str::contains("1 of 2 filters could not be resolved"));
}

#[test]
fn test_resolve_service_without_base_query() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();

    sitreps()
        .args(["resolve", "-c"])
        .arg(&config)
        .args(["--service", "sonarqube"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("has no base query"));
}

#[test]
fn test_resolve_rejects_bad_param() {
    let ctx = TestContext::new().unwrap();
    let config = ctx.write_file("settings.yaml", SAMPLE_SETTINGS_YAML).unwrap();

    sitreps()
        .args(["resolve", "-c"])
        .arg(&config)
        .args(["-p", "project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_tests_command_counts_pytest() {
    let ctx = TestContext::new().unwrap();
    let log = ctx
        .write_file(
            "build.log",
            "+ pytest -v\ncollected 12 items\n\x1b[32m12 passed\x1b[0m in 1.2s\n",
        )
        .unwrap();

    sitreps()
        .arg("tests")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::diff("12\n"));
}

#[test]
fn test_tests_command_unknown_tool() {
    let ctx = TestContext::new().unwrap();
    let log = ctx.write_file("build.log", "collected 1 items\n").unwrap();

    sitreps()
        .arg("tests")
        .arg(&log)
        .args(["--tool", "junit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --tool list 'junit'"));
}

#[test]
fn test_coverage_htmlcov() {
    let ctx = TestContext::new().unwrap();
    let html = ctx
        .write_file(
            "index.html",
            r#"<h1>Coverage report: <span class="pc_cov">87%</span></h1>"#,
        )
        .unwrap();

    sitreps()
        .arg("coverage")
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::diff("87.00\n"));
}

#[test]
fn test_coverage_codecov_and_pattern() {
    let ctx = TestContext::new().unwrap();
    let payload = ctx
        .write_file("codecov.json", r#"{"commit": {"totals": {"c": "81.25000"}}}"#)
        .unwrap();
    let log = ctx
        .write_file("build.log", "TOTAL 1200 84 93%\nCoverage: 93.5%\n")
        .unwrap();

    sitreps()
        .arg("coverage")
        .arg(&payload)
        .arg("--codecov")
        .assert()
        .success()
        .stdout(predicate::str::diff("81.25\n"));

    sitreps()
        .arg("coverage")
        .arg(&log)
        .args(["--pattern", r"Coverage: ([0-9.]+)%"])
        .assert()
        .success()
        .stdout(predicate::str::diff("93.50\n"));
}

#[test]
fn test_coverage_not_found() {
    let ctx = TestContext::new().unwrap();
    let html = ctx.write_file("index.html", "<html></html>").unwrap();

    sitreps()
        .arg("coverage")
        .arg(&html)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No coverage found"));
}
