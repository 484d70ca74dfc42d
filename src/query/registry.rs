//! Registry of named filter fragments
//!
//! Filters are registered once from configuration and read concurrently
//! afterwards. Registration order is kept so reports have a stable column
//! order.

use super::template::{Params, ResolvedQuery, Template, TemplateError};
use crate::config::ServiceSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised by registry misuse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("filter '{0}' is already registered")]
    DuplicateFilter(String),

    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
}

/// A named, reusable query clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub name: String,
    pub fragment: String,
}

impl FilterDefinition {
    pub fn new(name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragment: fragment.into(),
        }
    }
}

/// Ordered mapping from filter name to fragment template
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: Vec<FilterDefinition>,
    index: HashMap<String, usize>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from definitions, failing on the first duplicate name
    pub fn from_definitions<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = FilterDefinition>,
    {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition.name, definition.fragment)?;
        }
        Ok(registry)
    }

    /// Build a registry from the `filters` section of a service
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, RegistryError> {
        Self::from_definitions(settings.filters.iter().cloned())
    }

    /// Register a filter; redefinition is rejected and leaves the registry unchanged
    pub fn register(
        &mut self,
        name: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateFilter(name));
        }

        debug!("Registering filter '{}'", name);
        self.index.insert(name.clone(), self.filters.len());
        self.filters.push(FilterDefinition {
            name,
            fragment: fragment.into(),
        });
        Ok(())
    }

    /// Fragment registered under `name`
    pub fn get(&self, name: &str) -> Result<&str, RegistryError> {
        self.index
            .get(name)
            .map(|&i| self.filters[i].fragment.as_str())
            .ok_or_else(|| RegistryError::UnknownFilter(name.to_string()))
    }

    /// Render the fragment registered under `name` and combine it with `base`
    ///
    /// The fragment is itself a template and sees the same `params` as the
    /// base query.
    pub fn resolve<E>(
        &self,
        name: &str,
        base: &Template,
        params: &Params,
    ) -> Result<ResolvedQuery, E>
    where
        E: From<RegistryError> + From<TemplateError>,
    {
        let fragment = Template::parse(self.get(name)?)?.render(params)?;
        Ok(base.resolve(params, Some(&fragment))?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Filter names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
