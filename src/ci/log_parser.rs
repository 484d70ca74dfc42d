//! Unit test counting from CI logs
//!
//! Each testing tool prints a characteristic summary line. Tools are either
//! given explicitly or detected from the log, and the per-tool counts are
//! summed until the log reaches the coverage upload or deployment step.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("Invalid regex pattern")
});

static PYTEST_COLLECTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"collected ([0-9]+) items").expect("Invalid regex pattern"));
static PYUNITTEST_RAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Ran ([0-9]+) tests in").expect("Invalid regex pattern"));
static NPM_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Tests:.+, ([0-9]+) total").expect("Invalid regex pattern"));
static RAKE_TESTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+) tests,").expect("Invalid regex pattern"));
static MAVEN_TESTS_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Tests run: ([0-9]+),").expect("Invalid regex pattern"));
static OTHER_TESTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Tests: ([0-9]+)").expect("Invalid regex pattern"));

/// Lines after which no more test output is expected
const STOP_MARKERS: &[&str] = &["https://codecov.io/upload", "bonfire deploy-iqe-cji"];

/// Names accepted in an explicit tool list
pub const KNOWN_TESTING_TOOLS: &[&str] =
    &["gotest", "pytest", "pyunittest", "npm", "rake", "maven", "other"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown testing tool '{0}'; known tools are gotest, pytest, pyunittest, npm, rake, maven, other")]
pub struct UnknownToolError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestingTool {
    GoTest,
    Pytest,
    PyUnittest,
    Npm,
    Rake,
    Maven,
    Other,
}

impl TestingTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoTest => "gotest",
            Self::Pytest => "pytest",
            Self::PyUnittest => "pyunittest",
            Self::Npm => "npm",
            Self::Rake => "rake",
            Self::Maven => "maven",
            Self::Other => "other",
        }
    }

    /// Whether `line` shows this tool was run
    fn detects(&self, line: &str) -> bool {
        match self {
            Self::GoTest => line.contains("=== RUN "),
            Self::Pytest => line.contains("pytest") || line.contains("py.test"),
            Self::PyUnittest => line.contains("Ran ") && line.contains(" tests in "),
            Self::Npm => line.contains("npm") || line.contains("yarn test"),
            Self::Rake => line.contains("rake ") && line.contains("validate"),
            Self::Maven => line.contains("maven"),
            Self::Other => line.contains("Suite duration: ") && line.contains(" Tests: "),
        }
    }

    /// Tests reported on `line`, `None` when the line is not a summary for this tool
    fn count(&self, line: &str) -> Option<u64> {
        let contains_all = |needles: &[&str]| needles.iter().all(|n| line.contains(n));
        match self {
            Self::GoTest => contains_all(&["=== RUN "]).then_some(1),
            Self::Pytest if contains_all(&["collected ", " items"]) => {
                Some(capture(&PYTEST_COLLECTED, line))
            }
            Self::PyUnittest if contains_all(&["Ran ", " tests in "]) => {
                Some(capture(&PYUNITTEST_RAN, line))
            }
            Self::Npm if contains_all(&["Tests:", " total"]) => Some(capture(&NPM_TOTAL, line)),
            Self::Rake if contains_all(&["tests", "assertions", "failures"]) => {
                Some(capture(&RAKE_TESTS, line))
            }
            Self::Maven if contains_all(&["Tests run", "Failures", "Errors", "Skipped"]) => {
                Some(capture(&MAVEN_TESTS_RUN, line))
            }
            Self::Other if contains_all(&["Suite duration: ", " Tests: "]) => {
                Some(capture(&OTHER_TESTS, line))
            }
            _ => None,
        }
    }

    fn all() -> [Self; 7] {
        [
            Self::GoTest,
            Self::Pytest,
            Self::PyUnittest,
            Self::Npm,
            Self::Rake,
            Self::Maven,
            Self::Other,
        ]
    }
}

impl fmt::Display for TestingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestingTool {
    type Err = UnknownToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::all()
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| UnknownToolError(name.to_string()))
    }
}

/// First capture group as a number; a summary line without one counts zero
fn capture(pattern: &Regex, line: &str) -> u64 {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Remove ANSI color and cursor escape sequences
pub fn escape_ansi(log: &str) -> String {
    ANSI_ESCAPE.replace_all(log, "").into_owned()
}

/// Testing tools whose output appears in `log`
pub fn detect_testing_tools(log: &str) -> BTreeSet<TestingTool> {
    let log = escape_ansi(log);
    let found: BTreeSet<TestingTool> = log
        .lines()
        .flat_map(|line| {
            TestingTool::all()
                .into_iter()
                .filter(move |tool| tool.detects(line))
        })
        .collect();

    match found.len() {
        0 => warn!("No testing tool detected"),
        1 => {}
        _ => warn!(
            "Multiple testing tools detected ({}); set an explicit tool list",
            join(&found)
        ),
    }
    found
}

/// Parse a comma separated tool list such as `pytest,gotest`
pub fn parse_tools(list: &str) -> Result<BTreeSet<TestingTool>, UnknownToolError> {
    list.split(',')
        .filter(|name| !name.trim().is_empty())
        .map(TestingTool::from_str)
        .collect()
}

/// Number of unit tests reported in `log`
///
/// `tools` restricts counting to a comma separated tool list; without it the
/// tools are detected from the log.
pub fn count_tests(log: &str, tools: Option<&str>) -> Result<u64, UnknownToolError> {
    let tools = match tools {
        Some(list) => parse_tools(list)?,
        None => detect_testing_tools(log),
    };
    info!("Counting tests for testing tools: {}", join(&tools));

    let mut total: u64 = 0;
    for line in escape_ansi(log).lines() {
        if STOP_MARKERS.iter().any(|marker| line.contains(marker)) {
            break;
        }
        if let Some(count) = tools.iter().find_map(|tool| {
            tool.count(line).inspect(|_| debug!("{}: {}", tool, line))
        }) {
            total = total.saturating_add(count);
        }
    }
    Ok(total)
}

fn join(tools: &BTreeSet<TestingTool>) -> String {
    tools
        .iter()
        .map(TestingTool::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTEST_LOG: &str = "\
+ python -m pytest tests/
============================= test session starts ==============================
collected 42 items

tests/test_api.py ........................................ [100%]
============================== 42 passed in 3.10s ==============================
";

    #[test]
    fn test_escape_ansi() {
        assert_eq!(escape_ansi("\x1b[32mPASSED\x1b[0m ok"), "PASSED ok");
        assert_eq!(escape_ansi("plain"), "plain");
    }

    #[test]
    fn test_detect_tools() {
        let tools = detect_testing_tools(PYTEST_LOG);
        assert_eq!(tools.into_iter().collect::<Vec<_>>(), vec![TestingTool::Pytest]);

        let log = "=== RUN   TestParse\n--- PASS: TestParse\n$ yarn test\n";
        let tools = detect_testing_tools(log);
        assert!(tools.contains(&TestingTool::GoTest));
        assert!(tools.contains(&TestingTool::Npm));

        assert!(detect_testing_tools("nothing to see").is_empty());
    }

    #[test]
    fn test_count_pytest() {
        assert_eq!(count_tests(PYTEST_LOG, None).unwrap(), 42);
    }

    #[test]
    fn test_count_gotest_lines() {
        let log = "\x1b[1m=== RUN   TestA\x1b[0m\n=== RUN   TestB\n=== RUN   TestB/sub\nok\n";
        assert_eq!(count_tests(log, None).unwrap(), 3);
    }

    #[test]
    fn test_count_each_tool_summary() {
        let cases = [
            ("Ran 17 tests in 0.532s", "pyunittest", 17),
            ("Tests:       2 skipped, 120 passed, 122 total", "npm", 122),
            ("55 tests, 210 assertions, 0 failures, 0 errors, 0 skips", "rake", 55),
            ("Tests run: 31, Failures: 0, Errors: 0, Skipped: 2", "maven", 31),
            ("Suite duration: 12.3s Tests: 8", "other", 8),
        ];

        for (line, tool, expected) in cases {
            assert_eq!(count_tests(line, Some(tool)).unwrap(), expected, "{tool}");
        }
    }

    #[test]
    fn test_counting_stops_at_upload_marker() {
        let log = "collected 5 items\n\
                   Uploading reports to https://codecov.io/upload/v4\n\
                   collected 100 items\n";
        assert_eq!(count_tests(log, Some("pytest")).unwrap(), 5);

        let log = "Ran 3 tests in 0.1s\nbonfire deploy-iqe-cji app\nRan 9 tests in 0.1s\n";
        assert_eq!(count_tests(log, Some("pyunittest")).unwrap(), 3);
    }

    #[test]
    fn test_explicit_tools_override_detection() {
        // Detection would also pick up the `=== RUN` lines
        let log = "=== RUN   TestA\ncollected 4 items\n";
        assert_eq!(count_tests(log, Some("pytest")).unwrap(), 4);
        assert_eq!(count_tests(log, Some("pytest,gotest")).unwrap(), 5);
    }

    #[test]
    fn test_unknown_tool_rejected() {
        let err = count_tests("", Some("pytest,junit")).unwrap_err();
        assert_eq!(err, UnknownToolError("junit".to_string()));
    }

    #[test]
    fn test_summary_without_number_counts_zero() {
        assert_eq!(count_tests("collected many items", Some("pytest")).unwrap(), 0);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let log = format!("collected {} items\ncollected 7 items\n", u64::MAX);
        assert_eq!(count_tests(&log, Some("pytest")).unwrap(), u64::MAX);
    }
}
