// Entrypoint for the GPR Reader CLI.
// - Keeps `main` small: set up logging, read the environment, build the HTTP
//   client and hand everything to the menu loop.
// - Every way out of the menu ends with status 0.

use anyhow::Context;
use gpr_reader::api::ApiClient;
use gpr_reader::config::{Config, LOG_ENV};
use gpr_reader::menu::{main_menu, FAREWELL};
use gpr_reader::reader::ReaderOptions;
use gpr_reader::ui::TerminalPrompter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Log to stderr so diagnostics never mix with the chat transcript.
fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    setup_logging();

    // Line prompts handle Ctrl+C themselves; this covers it everywhere else,
    // e.g. while a request is in flight.
    ctrlc::set_handler(|| {
        println!();
        println!("{}", FAREWELL);
        std::process::exit(0);
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut config = Config::from_env();
    let api = ApiClient::new(config.request_timeout)?;
    let mut prompter = TerminalPrompter::new()?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting GPR Reader");

    // Start the interactive menu. This call blocks until the user exits.
    // A failure inside the loop is reported, never turned into an exit status.
    if let Err(e) = main_menu(
        &mut config,
        &api,
        &mut prompter,
        &mut std::io::stdout(),
        ReaderOptions::default(),
    ) {
        error!(error = %e, "menu loop stopped");
        eprintln!("Error: {:#}", e);
        println!("{}", FAREWELL);
    }
    Ok(())
}
