//! Sample configuration documents

/// Settings with a Jira service, three filters and default params
pub const SAMPLE_SETTINGS_YAML: &str = r#"
log_level: info
max_concurrency: 2
execution_timeout: 5s
params:
  project: FOO
  type: Bug
jira:
  url: https://issues.example.com
  username: null
  token: null
  base_query: 'project = "{project}" AND type = {type}'
  filters:
    resolved: resolution != Unresolved
    unresolved: resolution = Unresolved
    blocker: priority = Blocker AND resolution = Unresolved
jenkins:
  url: https://ci.example.com
  no_auth: true
github:
  token: null
repos:
  - title: Frontend
    url: https://github.com/acme/frontend
    branch: main
"#;

/// Per-project override layered on top of [`SAMPLE_SETTINGS_YAML`]
pub const SAMPLE_OVERRIDE_YAML: &str = r#"
params:
  project: BAR
jira:
  filters:
    critical: priority = Critical
"#;
