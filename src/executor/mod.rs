//! Query executor boundary
//!
//! Service clients (Jira, Jenkins, GitHub, SonarQube) implement
//! [`QueryExecutor`]. This crate only ships decorators and test doubles;
//! network access lives with the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod retry;

pub use retry::{RetryPolicy, RetryingExecutor};

/// Failure modes reported by an executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Credentials missing or rejected
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Rate limits, timeouts, 5xx responses; may succeed on retry
    #[error("transient service error: {0}")]
    TransientService(String),

    /// The service rejected the query text
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ExecutorError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientService(_))
    }
}

/// Result of executing one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResult {
    /// Number of matching items
    Count(u64),
    /// The matching items themselves
    Items(Vec<serde_json::Value>),
}

impl QueryResult {
    /// Number of matches regardless of representation
    pub fn count(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Items(items) => items.len() as u64,
        }
    }
}

/// Executes resolved queries against an external service
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `query` and return a count or the matching items
    async fn execute(&self, query: &str) -> Result<QueryResult, ExecutorError>;

    /// Name used in log messages
    fn name(&self) -> &str {
        "executor"
    }
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn execute(&self, query: &str) -> Result<QueryResult, ExecutorError> {
        (**self).execute(query).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
