//! Retry decorator for transient service failures

use super::{ExecutorError, QueryExecutor, QueryResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Fixed-delay retry within a time budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts
    pub delay: Duration,
    /// Total time after which no new attempt is started
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            budget: Duration::from_secs(10),
        }
    }
}

/// Wraps an executor and retries `TransientService` errors
///
/// The first attempt always runs. Authentication and invalid-query errors
/// are returned without retrying.
pub struct RetryingExecutor<E> {
    inner: E,
    policy: RetryPolicy,
}

impl<E: QueryExecutor> RetryingExecutor<E> {
    pub fn new(inner: E, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait]
impl<E: QueryExecutor> QueryExecutor for RetryingExecutor<E> {
    async fn execute(&self, query: &str) -> Result<QueryResult, ExecutorError> {
        let deadline = Instant::now() + self.policy.budget;
        let mut tries = 0u32;

        loop {
            tries += 1;
            match self.inner.execute(query).await {
                Ok(result) => {
                    if tries > 1 {
                        debug!("[{}] query succeeded after {} tries", self.inner.name(), tries);
                    }
                    return Ok(result);
                }
                Err(err) if err.is_transient() => {
                    warn!(
                        "[{}] {} tries fail, handling error: {}",
                        self.inner.name(),
                        tries,
                        err
                    );
                    if Instant::now() + self.policy.delay >= deadline {
                        return Err(err);
                    }
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
