//! CI log analysis: unit test counts and coverage percentages

pub mod coverage;
pub mod log_parser;

pub use coverage::{codecov_coverage, htmlcov_coverage, regex_coverage, HTMLCOV_PATTERN};
pub use log_parser::{
    count_tests, detect_testing_tools, escape_ansi, parse_tools, TestingTool, UnknownToolError,
    KNOWN_TESTING_TOOLS,
};
