//! `sitreps validate` and `sitreps resolve`

use crate::config::{load_layered, Settings};
use crate::error::SitrepsError;
use crate::metrics::AggregationError;
use crate::query::{FilterRegistry, Params, Template};
use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::debug;

fn load(config: &Path, override_path: Option<&Path>) -> Result<Settings> {
    Ok(load_layered(config, override_path).map_err(SitrepsError::from)?)
}

/// Load, validate and summarize settings
pub async fn run_validate_command(config: &Path, override_path: Option<&Path>) -> Result<()> {
    let settings = load(config, override_path)?;

    println!("Configuration is valid: {}", config.display());
    for (name, service) in settings.services() {
        if service.is_enabled() {
            let auth = if service.has_credentials() {
                "credentials set"
            } else {
                "no credentials"
            };
            println!(
                "  {name}: enabled, {} filters, {auth}",
                service.filters.len()
            );
        } else {
            println!("  {name}: disabled");
        }
    }

    for repo in &settings.repos {
        let provider = repo
            .provider()
            .map(|p| p.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        println!(
            "  repo {}: {} ({provider}, {})",
            repo.title,
            repo.repo_slug(),
            repo.branch
        );
    }
    Ok(())
}

/// Print `name<TAB>query` for each requested filter
///
/// Filters that cannot be resolved are reported on stderr and make the
/// command fail once every filter has been printed.
pub async fn run_resolve_command(
    config: &Path,
    override_path: Option<&Path>,
    service_name: &str,
    params: Vec<(String, String)>,
    filters: Vec<String>,
) -> Result<()> {
    let settings = load(config, override_path)?;
    let service = settings
        .service(service_name)
        .ok_or_else(|| anyhow!("unknown service '{service_name}'; expected jira, jenkins, github or sonarqube"))?;

    let base_query = service.base_query.as_deref().ok_or_else(|| {
        SitrepsError::from(AggregationError::MissingBaseQuery(service_name.to_string()))
    })?;
    let base = Template::parse(base_query).map_err(SitrepsError::from)?;
    let registry = FilterRegistry::from_settings(service).map_err(SitrepsError::from)?;

    let overrides: Params = params.into_iter().collect();
    let params = settings.params_with(&overrides);

    let names: Vec<String> = if filters.is_empty() {
        registry.names().map(str::to_string).collect()
    } else {
        filters
    };
    if names.is_empty() {
        println!("{}", base.resolve(&params, None).map_err(SitrepsError::from)?);
        return Ok(());
    }

    let mut failed = 0;
    for name in &names {
        match registry.resolve::<SitrepsError>(name, &base, &params) {
            Ok(query) => {
                debug!("Resolved filter '{}'", name);
                println!("{name}\t{query}");
            }
            Err(err) => {
                failed += 1;
                eprintln!("{name}\terror: {}", err.user_message());
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{failed} of {} filters could not be resolved", names.len()));
    }
    Ok(())
}
