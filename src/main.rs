use clap::Parser;
use sitreps::cli::{execute_command, get_log_level, Cli};
use sitreps::config::{load_value, ENV_PREFIX};
use sitreps::error::SitrepsError;
use tracing::{debug, error, trace};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let configured = configured_log_level(&cli);
    let log_level = get_log_level(cli.verbose, configured.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("sitreps started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = execute_command(cli.command).await {
        error!("Fatal error: {:#}", e);
        let exit_code = match e.downcast_ref::<SitrepsError>() {
            Some(err) => {
                eprintln!("Error: {}", err.user_message());
                err.exit_code()
            }
            None => {
                eprintln!("Error: {e:#}");
                1
            }
        };
        std::process::exit(exit_code);
    }
}

/// `log_level` from the environment or the settings file, read before
/// logging is set up
fn configured_log_level(cli: &Cli) -> Option<String> {
    if let Ok(level) = std::env::var(format!("{ENV_PREFIX}_LOG_LEVEL")) {
        return Some(level);
    }
    let document = load_value(cli.command.config_path()?).ok()?;
    document.get("log_level")?.as_str().map(str::to_string)
}
