//! # handbook CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use handbook_cli::browse::{run_browse, BrowseArgs};
use handbook_cli::render_sidebar;
use handbook_cli::validate::{run_validate, ValidateArgs};
use handbook_client::{ClientConfig, HttpContentSource, Sidebar};

/// Employee handbook browser.
#[derive(Parser, Debug)]
#[command(name = "handbook", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Base URL of the handbook server.
    #[arg(
        long,
        env = "HANDBOOK_BASE_URL",
        default_value = "http://localhost:8080",
        global = true
    )]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = handbook_client::config::DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the handbook page and print what it shows.
    Browse(BrowseArgs),

    /// Print the navigation tree.
    Sidebar,

    /// Check a YAML seed file.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Browse(args) => client_config(&cli).and_then(|config| run_browse(args, &config)),
        Commands::Sidebar => client_config(&cli).and_then(|config| run_sidebar(&config)),
        Commands::Validate(args) => run_validate(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    Ok(ClientConfig::new(&cli.base_url)?.with_timeout(cli.timeout))
}

fn run_sidebar(config: &ClientConfig) -> anyhow::Result<u8> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let navigation = runtime.block_on(async {
        let source = HttpContentSource::new(config)?;
        anyhow::Ok(source.fetch_navigation().await?)
    })?;
    print!("{}", render_sidebar(&Sidebar::from_navigation(&navigation)));
    Ok(0)
}
