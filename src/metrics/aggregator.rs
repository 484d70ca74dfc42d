//! Runs registered filters through an executor and assembles a snapshot

use super::snapshot::{FailureKind, MetricValue, MetricsSnapshot};
use crate::config::{ServiceSettings, Settings};
use crate::executor::QueryExecutor;
use crate::query::{FilterRegistry, Params, RegistryError, ResolvedQuery, Template, TemplateError};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a whole collection run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("no filters are registered")]
    EmptyRegistry,

    #[error("invalid base template: {0}")]
    InvalidBaseTemplate(#[source] TemplateError),

    #[error("service '{0}' is disabled (no url configured)")]
    ServiceDisabled(String),

    #[error("service '{0}' has no base query")]
    MissingBaseQuery(String),

    #[error("invalid filters: {0}")]
    InvalidFilters(#[source] RegistryError),
}

/// Concurrency and timeout limits for a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorOptions {
    pub max_concurrency: usize,
    pub timeout: Option<Duration>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            timeout: None,
        }
    }
}

impl AggregatorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_concurrency: settings.max_concurrency,
            timeout: settings.execution_timeout,
        }
    }
}

/// Resolves filters against a base template and executes them concurrently
pub struct MetricsAggregator {
    registry: Arc<FilterRegistry>,
    executor: Arc<dyn QueryExecutor>,
    options: AggregatorOptions,
}

impl MetricsAggregator {
    pub fn new(
        registry: Arc<FilterRegistry>,
        executor: Arc<dyn QueryExecutor>,
        options: AggregatorOptions,
    ) -> Self {
        Self {
            registry,
            executor,
            options,
        }
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn options(&self) -> AggregatorOptions {
        self.options
    }

    /// Evaluate `filter_names` against `base_template`
    ///
    /// Entries come back in `filter_names` order. Per-filter problems are
    /// recorded as [`MetricValue::Failed`]; only an empty registry or an
    /// unparsable base template fail the run.
    pub async fn collect<S>(
        &self,
        base_template: &str,
        params: &Params,
        filter_names: &[S],
    ) -> Result<MetricsSnapshot, AggregationError>
    where
        S: AsRef<str>,
    {
        self.collect_from(&self.registry, base_template, params, filter_names)
            .await
    }

    /// Evaluate every registered filter in registry order
    pub async fn collect_all(
        &self,
        base_template: &str,
        params: &Params,
    ) -> Result<MetricsSnapshot, AggregationError> {
        let names: Vec<&str> = self.registry.names().collect();
        self.collect(base_template, params, &names).await
    }

    /// Evaluate every filter configured for a service against its base query
    ///
    /// The service's own `filters` section is used, not the registry the
    /// aggregator was built with.
    pub async fn collect_service(
        &self,
        name: &str,
        service: &ServiceSettings,
        params: &Params,
    ) -> Result<MetricsSnapshot, AggregationError> {
        if !service.is_enabled() {
            return Err(AggregationError::ServiceDisabled(name.to_string()));
        }
        let base_template = service
            .base_query
            .as_deref()
            .ok_or_else(|| AggregationError::MissingBaseQuery(name.to_string()))?;
        let registry =
            FilterRegistry::from_settings(service).map_err(AggregationError::InvalidFilters)?;

        info!("Collecting service '{}'", name);
        let names: Vec<&str> = registry.names().collect();
        self.collect_from(&registry, base_template, params, &names)
            .await
    }

    async fn collect_from<S>(
        &self,
        registry: &FilterRegistry,
        base_template: &str,
        params: &Params,
        filter_names: &[S],
    ) -> Result<MetricsSnapshot, AggregationError>
    where
        S: AsRef<str>,
    {
        if registry.is_empty() {
            return Err(AggregationError::EmptyRegistry);
        }
        let base = Template::parse(base_template).map_err(AggregationError::InvalidBaseTemplate)?;

        let mut seen = HashSet::new();
        let names: Vec<&str> = filter_names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| seen.insert(*name))
            .collect();

        info!(
            "Collecting {} filters with {} (max concurrency {})",
            names.len(),
            self.executor.name(),
            self.options.max_concurrency
        );
        let started = Instant::now();

        let base = &base;
        let entries: Vec<(String, MetricValue)> = stream::iter(names)
            .map(|name| async move {
                (name.to_string(), self.evaluate(registry, base, params, name).await)
            })
            .buffered(self.options.max_concurrency.max(1))
            .collect()
            .await;

        let snapshot = MetricsSnapshot::new(Utc::now(), entries);
        info!(
            "Collected {} filters ({} failed) in {:?}",
            snapshot.len(),
            snapshot.failures().count(),
            started.elapsed()
        );
        Ok(snapshot)
    }

    async fn evaluate(
        &self,
        registry: &FilterRegistry,
        base: &Template,
        params: &Params,
        name: &str,
    ) -> MetricValue {
        let query: ResolvedQuery = match registry.resolve::<MetricValue>(name, base, params) {
            Ok(query) => query,
            Err(failure) => {
                warn!("Filter '{}' could not be resolved: {:?}", name, failure);
                return failure;
            }
        };
        debug!("Filter '{}' resolved to: {}", name, query);

        let execution = self.executor.execute(query.as_str());
        let outcome = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Filter '{}' timed out after {:?}", name, limit);
                    return MetricValue::failed(
                        FailureKind::Timeout,
                        format!("query timed out after {limit:?}"),
                    );
                }
            },
            None => execution.await,
        };

        match outcome {
            Ok(result) => result.into(),
            Err(err) => {
                warn!("Filter '{}' failed: {}", name, err);
                err.into()
            }
        }
    }
}
