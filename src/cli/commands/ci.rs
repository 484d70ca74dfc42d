//! `sitreps tests` and `sitreps coverage`

use crate::ci::{codecov_coverage, count_tests, htmlcov_coverage, regex_coverage};
use crate::error::ErrorExt;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// Print the number of unit tests found in a CI log
pub async fn run_tests_command(log: &Path, tool: Option<&str>) -> Result<()> {
    let content = tokio::fs::read_to_string(log)
        .await
        .with_context(|| format!("Failed to read CI log {}", log.display()))?;

    let count = count_tests(&content, tool)
        .to_sitreps(format!("Invalid --tool list '{}'", tool.unwrap_or_default()))?;
    println!("{count}");
    Ok(())
}

/// Print the coverage percentage found in `file`
pub async fn run_coverage_command(file: &Path, pattern: Option<&str>, codecov: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let coverage = if codecov {
        let payload: serde_json::Value = serde_json::from_str(&content)
            .to_parse_error(format!("{} is not a Codecov JSON payload", file.display()))?;
        codecov_coverage(&payload)
    } else if let Some(pattern) = pattern {
        regex_coverage(pattern, &content)
            .to_parse_error(format!("Invalid coverage pattern '{pattern}'"))?
    } else {
        htmlcov_coverage(&content)
    };

    let coverage = coverage.ok_or_else(|| anyhow!("No coverage found in {}", file.display()))?;
    println!("{coverage:.2}");
    Ok(())
}
