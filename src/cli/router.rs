//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::*;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Validate {
            config,
            override_path,
        } => run_validate_command(&config, override_path.as_deref()).await,
        Commands::Resolve {
            config,
            override_path,
            service,
            params,
            filters,
        } => {
            run_resolve_command(&config, override_path.as_deref(), &service, params, filters).await
        }
        Commands::Tests { log, tool } => run_tests_command(&log, tool.as_deref()).await,
        Commands::Coverage {
            file,
            pattern,
            codecov,
        } => run_coverage_command(&file, pattern.as_deref(), codecov).await,
    }
}
