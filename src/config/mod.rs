//! Settings for sitreps
//!
//! Settings are loaded once at startup from a YAML or JSON file, optionally
//! layered with a per-project override file and `SITREPS_*` environment
//! variables, validated, and then shared read-only.
//!
//! Every service section is optional. A service with no `url` is disabled;
//! missing or null credentials are accepted.

use crate::project::Repository;
use crate::query::{FilterDefinition, Params};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

pub mod error;
pub mod loader;
pub mod validator;

pub use error::{ConfigError, ValidationIssue};
pub use loader::{load_layered, load_layered_with, load_settings, load_value, merge_values};
pub use validator::VALID_LOG_LEVELS;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SITREPS";

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum number of filters evaluated concurrently.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-query execution timeout, e.g. `30s`.
    #[serde(default, with = "humantime_serde")]
    pub execution_timeout: Option<Duration>,

    /// Default template parameters.
    #[serde(default, deserialize_with = "scalar_params")]
    pub params: Params,

    #[serde(default, deserialize_with = "null_as_default")]
    pub jira: ServiceSettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub jenkins: ServiceSettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub github: ServiceSettings,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sonarqube: ServiceSettings,

    /// Repositories reported on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub repos: Vec<Repository>,
}

/// Connection details, query template and filters for one service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSettings {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// The service accepts anonymous requests.
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_auth: bool,

    /// Base query template, e.g. `project = "{project}" AND type = {type}`.
    #[serde(default)]
    pub base_query: Option<String>,

    /// Named filter fragments in file order.
    #[serde(default, with = "filter_map")]
    pub filters: Vec<FilterDefinition>,
}

impl ServiceSettings {
    /// A service without a URL is disabled
    pub fn is_enabled(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Whether requests can be authenticated (or need not be)
    pub fn has_credentials(&self) -> bool {
        self.no_auth || self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn apply_env_overrides_with<F>(&mut self, service: &str, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |field: &str| format!("{ENV_PREFIX}_{service}_{field}");
        if let Some(url) = lookup(&key("URL")) {
            self.url = Some(url);
        }
        if let Some(username) = lookup(&key("USERNAME")) {
            self.username = Some(username);
        }
        if let Some(token) = lookup(&key("TOKEN")) {
            self.token = Some(token);
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_concurrency: default_max_concurrency(),
            execution_timeout: None,
            params: Params::new(),
            jira: ServiceSettings::default(),
            jenkins: ServiceSettings::default(),
            github: ServiceSettings::default(),
            sonarqube: ServiceSettings::default(),
            repos: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrency() -> usize {
    4
}

impl Settings {
    /// Parse settings from a YAML (or JSON) document without validating
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build settings from an already merged document
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_value(value)?)
    }

    /// Service section by name (`jira`, `jenkins`, `github`, `sonarqube`)
    pub fn service(&self, name: &str) -> Option<&ServiceSettings> {
        match name {
            "jira" => Some(&self.jira),
            "jenkins" => Some(&self.jenkins),
            "github" => Some(&self.github),
            "sonarqube" => Some(&self.sonarqube),
            _ => None,
        }
    }

    /// All service sections with their names, in a fixed order
    pub fn services(&self) -> [(&'static str, &ServiceSettings); 4] {
        [
            ("jira", &self.jira),
            ("jenkins", &self.jenkins),
            ("github", &self.github),
            ("sonarqube", &self.sonarqube),
        ]
    }

    /// Apply `SITREPS_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using a custom lookup, for tests
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(&format!("{ENV_PREFIX}_LOG_LEVEL")) {
            self.log_level = level;
        }
        self.jira.apply_env_overrides_with("JIRA", &lookup);
        self.jenkins.apply_env_overrides_with("JENKINS", &lookup);
        self.github.apply_env_overrides_with("GITHUB", &lookup);
        self.sonarqube.apply_env_overrides_with("SONARQUBE", &lookup);
    }

    /// Default params overlaid with `overrides`
    pub fn params_with(&self, overrides: &Params) -> Params {
        let mut params = self.params.clone();
        params.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept strings, numbers and booleans as parameter values; null entries are dropped
fn scalar_params<'de, D>(deserializer: D) -> Result<Params, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    let raw: Option<std::collections::BTreeMap<String, Option<Scalar>>> =
        Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value? {
                Scalar::Text(s) => s,
                Scalar::Integer(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Flag(b) => b.to_string(),
            };
            Some((key, value))
        })
        .collect())
}

/// `filters` as an ordered mapping of name -> fragment
///
/// Entries are kept in document order. Duplicate keys in a settings file are
/// already rejected by the YAML/JSON parser; settings assembled in code are
/// checked by the validator.
mod filter_map {
    use crate::query::FilterDefinition;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(filters: &[FilterDefinition], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(filters.len()))?;
        for filter in filters {
            map.serialize_entry(&filter.name, &filter.fragment)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<FilterDefinition>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FilterMapVisitor)
    }

    struct FilterMapVisitor;

    impl<'de> Visitor<'de> for FilterMapVisitor {
        type Value = Vec<FilterDefinition>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of filter name to query fragment")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut filters = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, fragment)) = access.next_entry::<String, String>()? {
                filters.push(FilterDefinition { name, fragment });
            }
            Ok(filters)
        }
    }
}
