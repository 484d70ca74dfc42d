//! Repository descriptors
//!
//! A repository entry in the settings names a hosted git repository. The
//! slug, short name and hosting provider are derived from its URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hosting providers, in the order they are matched against a URL host
pub const SUPPORTED_PROVIDERS: &[Provider] = &[Provider::Github, Provider::GitlabCee, Provider::Gitlab];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("'{0}' is not a supported URL; supported hosts are github, gitlab-cee, gitlab")]
    UnsupportedHost(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Github,
    GitlabCee,
    Gitlab,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::GitlabCee => "gitlab-cee",
            Self::Gitlab => "gitlab",
        }
    }

    /// Text searched for in the URL host
    fn host_marker(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::GitlabCee => "gitlab.cee",
            Self::Gitlab => "gitlab",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub title: String,
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Repository role, e.g. `test` or `product`
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_kind() -> String {
    "test".to_string()
}

impl Repository {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            branch: default_branch(),
            kind: default_kind(),
        }
    }

    /// `owner/name` taken from the last two URL path components
    pub fn repo_slug(&self) -> String {
        let components: Vec<&str> = self.url.trim_end_matches('/').split('/').collect();
        let start = components.len().saturating_sub(2);
        components[start..].join("/")
    }

    /// Last component of the slug
    pub fn name(&self) -> String {
        self.repo_slug()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Hosting provider detected from the URL host
    pub fn provider(&self) -> Result<Provider, RepositoryError> {
        let host = url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .ok_or_else(|| RepositoryError::UnsupportedHost(self.url.clone()))?;

        SUPPORTED_PROVIDERS
            .iter()
            .copied()
            .find(|provider| host.contains(provider.host_marker()))
            .ok_or_else(|| RepositoryError::UnsupportedHost(self.url.clone()))
    }
}
