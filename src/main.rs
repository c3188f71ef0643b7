//! Entity Repository - Application entry point
//!
//! CLI-based entry point that dispatches to various commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entity_repository::{
    cli::{Cli, Commands},
    commands,
    config::{Config, VERBOSE_LOG_LEVEL},
    domain::Product,
    infra::MemoryDatabase,
    services::Registry,
    AppResult,
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; the CLI flag wins over the environment
    let config = Config::from_env().with_data_dir(cli.data_dir.clone());

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose, &config);
    tracing::debug!(persistent = config.is_persistent(), "Configuration loaded");

    // Handle errors
    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> AppResult<()> {
    let registry = Registry::new(MemoryDatabase::open(&config));
    registry.register::<Product>()?;

    match cli.command {
        Commands::Products(args) => commands::products::execute(args, &registry).await,
        Commands::Demo => commands::demo::execute().await,
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool, config: &Config) {
    let filter = if verbose {
        VERBOSE_LOG_LEVEL.to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
