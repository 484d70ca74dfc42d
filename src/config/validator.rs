use super::{ConfigError, ServiceSettings, Settings, ValidationIssue};
use crate::project::Repository;
use crate::query::Template;
use std::collections::HashSet;

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `max_concurrency`.
pub const MAX_CONCURRENCY_LIMIT: usize = 64;

impl Settings {
    /// Validate settings, reporting every problem at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(issues))
        }
    }

    /// All problems found in these settings
    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            issues.push(ValidationIssue::new(
                "log_level",
                format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            ));
        }

        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            issues.push(ValidationIssue::new(
                "max_concurrency",
                format!("must be between 1 and {MAX_CONCURRENCY_LIMIT}"),
            ));
        }

        if self.execution_timeout.is_some_and(|t| t.is_zero()) {
            issues.push(ValidationIssue::new(
                "execution_timeout",
                "must be greater than zero",
            ));
        }

        for (name, service) in self.services() {
            validate_service(name, service, &mut issues);
        }

        for (index, repo) in self.repos.iter().enumerate() {
            validate_repository(index, repo, &mut issues);
        }

        issues
    }
}

fn validate_service(name: &str, service: &ServiceSettings, issues: &mut Vec<ValidationIssue>) {
    if let Some(url) = &service.url {
        if let Err(err) = url::Url::parse(url) {
            issues.push(ValidationIssue::new(
                format!("{name}.url"),
                format!("invalid URL '{url}': {err}"),
            ));
        }
    }

    if let Some(base_query) = &service.base_query {
        if let Err(err) = Template::parse(base_query) {
            issues.push(ValidationIssue::new(format!("{name}.base_query"), err.to_string()));
        }
    }

    let mut seen = HashSet::new();
    for filter in &service.filters {
        let path = format!("{name}.filters.{}", filter.name);
        if !seen.insert(filter.name.as_str()) {
            issues.push(ValidationIssue::new(path.clone(), "duplicate filter name"));
        }
        if let Err(err) = Template::parse(&filter.fragment) {
            issues.push(ValidationIssue::new(path, err.to_string()));
        }
    }
}

fn validate_repository(index: usize, repo: &Repository, issues: &mut Vec<ValidationIssue>) {
    if let Err(err) = repo.provider() {
        issues.push(ValidationIssue::new(format!("repos[{index}].url"), err.to_string()));
    }
}
