//! Mock query executor for testing

use crate::executor::{ExecutorError, QueryExecutor, QueryResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

type Response = Result<QueryResult, ExecutorError>;

/// Builder for creating configured mock executors
pub struct MockQueryExecutorBuilder {
    name: String,
    responses: HashMap<String, VecDeque<Response>>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    default_response: Option<Response>,
}

impl MockQueryExecutorBuilder {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: HashMap::new(),
            delays: HashMap::new(),
            default_delay: None,
            default_response: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_count(self, query: &str, count: u64) -> Self {
        self.with_sequence(query, vec![Ok(QueryResult::Count(count))])
    }

    pub fn with_items(self, query: &str, items: Vec<serde_json::Value>) -> Self {
        self.with_sequence(query, vec![Ok(QueryResult::Items(items))])
    }

    pub fn with_error(self, query: &str, error: ExecutorError) -> Self {
        self.with_sequence(query, vec![Err(error)])
    }

    /// Responses returned in order; the last one repeats once the rest are used
    pub fn with_sequence(mut self, query: &str, responses: Vec<Response>) -> Self {
        self.responses
            .insert(query.to_string(), responses.into_iter().collect());
        self
    }

    /// Sleep before answering `query`
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Sleep before answering any query without its own delay
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Response for queries with nothing configured
    pub fn with_default(mut self, response: Response) -> Self {
        self.default_response = Some(response);
        self
    }

    pub fn build(self) -> MockQueryExecutor {
        MockQueryExecutor {
            name: self.name,
            responses: Mutex::new(self.responses),
            delays: self.delays,
            default_delay: self.default_delay,
            default_response: self.default_response,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl Default for MockQueryExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock implementation of QueryExecutor keyed by exact query text
///
/// Unconfigured queries fail with `InvalidQuery` unless a default response
/// is set.
pub struct MockQueryExecutor {
    name: String,
    responses: Mutex<HashMap<String, VecDeque<Response>>>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    default_response: Option<Response>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockQueryExecutor {
    pub fn new() -> Self {
        MockQueryExecutorBuilder::new().build()
    }

    pub fn builder() -> MockQueryExecutorBuilder {
        MockQueryExecutorBuilder::new()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Queries received, in arrival order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Highest number of concurrent `execute` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self, query: &str) -> Response {
        let mut responses = lock(&self.responses);
        match responses.get_mut(query) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(ExecutorError::InvalidQuery(query.to_string()))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ExecutorError::InvalidQuery(query.to_string()))),
            None => self.default_response.clone().unwrap_or_else(|| {
                Err(ExecutorError::InvalidQuery(format!(
                    "no mock response for query: {query}"
                )))
            }),
        }
    }
}

impl Default for MockQueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, query: &str) -> Result<QueryResult, ExecutorError> {
        lock(&self.calls).push(query.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(query).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }
        let response = self.next_response(query);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
