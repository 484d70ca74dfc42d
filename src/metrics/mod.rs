//! Metrics aggregation
//!
//! The aggregator resolves each requested filter against a base query,
//! hands the result to a [`QueryExecutor`](crate::executor::QueryExecutor)
//! and records a [`MetricValue`] per filter. Failures of a single filter are
//! recorded in the snapshot and never abort the run.

pub mod aggregator;
pub mod snapshot;

pub use aggregator::{AggregationError, AggregatorOptions, MetricsAggregator};
pub use snapshot::{FailureKind, MetricValue, MetricsSnapshot};
