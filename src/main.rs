//! QuoteSim CLI - Mock OpenAI streaming server
//!
//! Usage:
//!   quotesim [OPTIONS]
//!
//! Examples:
//!   quotesim
//!   PORT=9000 VERBOSE=false quotesim
//!   quotesim --config quotesim.yaml --json-logs

use clap::Parser;
use quotesim::cli::{Config, ConfigError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// QuoteSim - streams canned quotes like an OpenAI chat model
#[derive(Parser, Debug)]
#[command(name = "quotesim")]
#[command(author, version, about = "Mock OpenAI streaming server", long_about = None)]
struct Cli {
    /// Configuration file path (YAML)
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Do not print the startup banner
    #[arg(long)]
    no_banner: bool,
}

/// Defaults, then the YAML file, then the environment, then CLI flags.
/// Returns the configuration and any environment warnings to log.
fn build_config(cli: &Cli) -> Result<(Config, Vec<String>), ConfigError> {
    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::default()
    };

    let warnings = config.apply_env();

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    config.validate()?;
    Ok((config, warnings))
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_filter().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config, warnings) = build_config(&cli)?;

    init_tracing(&config);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    if let Some(path) = &cli.config {
        tracing::info!("Loaded configuration from {}", path);
    }

    quotesim::cli::run_server_with_banner(config, !cli.no_banner).await
}
