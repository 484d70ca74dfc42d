//! CLI command handlers
//!
//! Argument parsing lives in [`args`], dispatch in [`router`] and each
//! subcommand in [`commands`].

pub mod args;
pub mod commands;
pub mod help;
pub mod router;
pub mod validation;

pub use args::{Cli, Commands};
pub use help::{generate_help, get_log_level};
pub use router::execute_command;
pub use validation::parse_key_value;
