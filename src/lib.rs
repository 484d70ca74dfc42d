//! # sitreps
//!
//! Query-template resolution and metrics aggregation for engineering status
//! reports.
//!
//! Named filter fragments are combined with a per-service base query,
//! executed through a [`QueryExecutor`](executor::QueryExecutor) and
//! collected into an ordered [`MetricsSnapshot`](metrics::MetricsSnapshot).
//!
//! ## Usage
//!
//! ```bash
//! sitreps validate -c settings.yaml [--override project.yaml]
//! sitreps resolve -c settings.yaml -p project=FOO [filter...]
//! sitreps tests build.log [--tool pytest]
//! sitreps coverage htmlcov/index.html
//! ```
//!
//! ## Modules
//!
//! - `query` - Template parsing/substitution and the filter registry
//! - `executor` - The executor trait and a retrying decorator
//! - `metrics` - Concurrent aggregation into metric snapshots
//! - `config` - Layered YAML/JSON settings with validation
//! - `ci` - Unit test counts and coverage from CI output
//! - `project` - Repository descriptors
//! - `cli` - The `sitreps` command line
//! - `testing` - Test utilities and executor mocks
pub mod ci;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod project;
pub mod query;

pub mod testing;
