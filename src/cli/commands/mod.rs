//! Command implementation modules

pub mod ci;
pub mod settings;

pub use ci::{run_coverage_command, run_tests_command};
pub use settings::{run_resolve_command, run_validate_command};
