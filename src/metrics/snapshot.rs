//! Results of one aggregation run

use crate::executor::{ExecutorError, QueryResult};
use crate::query::{RegistryError, TemplateError};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Why a filter produced no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingParameter,
    MalformedTemplate,
    UnknownFilter,
    InvalidQuery,
    Authentication,
    TransientService,
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingParameter => "missing_parameter",
            Self::MalformedTemplate => "malformed_template",
            Self::UnknownFilter => "unknown_filter",
            Self::InvalidQuery => "invalid_query",
            Self::Authentication => "authentication",
            Self::TransientService => "transient_service",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TemplateError> for FailureKind {
    fn from(err: &TemplateError) -> Self {
        match err {
            TemplateError::MissingParameter { .. } => Self::MissingParameter,
            TemplateError::Malformed { .. } => Self::MalformedTemplate,
        }
    }
}

impl From<&RegistryError> for FailureKind {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::UnknownFilter(_) => Self::UnknownFilter,
            // Only reachable through registration, never through lookup
            RegistryError::DuplicateFilter(_) => Self::InvalidQuery,
        }
    }
}

impl From<&ExecutorError> for FailureKind {
    fn from(err: &ExecutorError) -> Self {
        match err {
            ExecutorError::Authentication(_) => Self::Authentication,
            ExecutorError::TransientService(_) => Self::TransientService,
            ExecutorError::InvalidQuery(_) => Self::InvalidQuery,
        }
    }
}

/// Outcome recorded for one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricValue {
    Count { count: u64 },
    Items { items: Vec<serde_json::Value> },
    Failed { kind: FailureKind, message: String },
}

impl MetricValue {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Number of matches, `None` for failures
    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Count { count } => Some(*count),
            Self::Items { items } => Some(items.len() as u64),
            Self::Failed { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<QueryResult> for MetricValue {
    fn from(result: QueryResult) -> Self {
        match result {
            QueryResult::Count(count) => Self::Count { count },
            QueryResult::Items(items) => Self::Items { items },
        }
    }
}

impl From<TemplateError> for MetricValue {
    fn from(err: TemplateError) -> Self {
        Self::failed(FailureKind::from(&err), err.to_string())
    }
}

impl From<RegistryError> for MetricValue {
    fn from(err: RegistryError) -> Self {
        Self::failed(FailureKind::from(&err), err.to_string())
    }
}

impl From<ExecutorError> for MetricValue {
    fn from(err: ExecutorError) -> Self {
        Self::failed(FailureKind::from(&err), err.to_string())
    }
}

/// Ordered filter name -> value mapping from one collection run
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    collected_at: DateTime<Utc>,
    entries: Vec<(String, MetricValue)>,
}

impl MetricsSnapshot {
    pub fn new(collected_at: DateTime<Utc>, entries: Vec<(String, MetricValue)>) -> Self {
        Self {
            collected_at,
            entries,
        }
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// Filter names in collection order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that failed, in collection order
    pub fn failures(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.iter().filter(|(_, value)| value.is_failure())
    }

    pub fn into_entries(self) -> Vec<(String, MetricValue)> {
        self.entries
    }
}

struct OrderedMetrics<'a>(&'a [(String, MetricValue)]);

impl Serialize for OrderedMetrics<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for MetricsSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MetricsSnapshot", 2)?;
        state.serialize_field("collected_at", &self.collected_at)?;
        state.serialize_field("metrics", &OrderedMetrics(&self.entries))?;
        state.end()
    }
}
