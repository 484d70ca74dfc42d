//! CLI argument structures

use crate::cli::validation::parse_key_value;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Inspect sitreps settings, queries and CI output
#[derive(Parser)]
#[command(name = "sitreps")]
#[command(about = "sitreps - Resolve metric queries and inspect CI output", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate a settings file
    Validate {
        /// Settings file (.yaml, .yml or .json)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Per-project settings layered on top of --config
        #[arg(long = "override", value_name = "FILE")]
        override_path: Option<PathBuf>,
    },

    /// Print the resolved query for each filter without executing it
    Resolve {
        /// Settings file (.yaml, .yml or .json)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Per-project settings layered on top of --config
        #[arg(long = "override", value_name = "FILE")]
        override_path: Option<PathBuf>,

        /// Service whose base query and filters are used
        #[arg(short = 's', long, default_value = "jira")]
        service: String,

        /// Template parameter, overriding the settings file
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Filters to resolve (default: all, in settings order)
        filters: Vec<String>,
    },

    /// Count unit tests in a CI log
    Tests {
        /// CI log file
        log: PathBuf,

        /// Comma separated testing tools (gotest, pytest, pyunittest, npm, rake, maven, other)
        #[arg(long)]
        tool: Option<String>,
    },

    /// Extract a coverage percentage
    Coverage {
        /// Coverage.py HTML report, CI log or Codecov JSON payload
        file: PathBuf,

        /// Regex whose first capture group is the percentage
        #[arg(long, conflicts_with = "codecov")]
        pattern: Option<String>,

        /// Read FILE as a Codecov branch API payload
        #[arg(long)]
        codecov: bool,
    },
}

impl Commands {
    /// Settings file used by the command, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Self::Validate { config, .. } | Self::Resolve { config, .. } => Some(config),
            Self::Tests { .. } | Self::Coverage { .. } => None,
        }
    }
}
