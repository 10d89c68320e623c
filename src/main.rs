//! Economic data API entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use econ_data_api::api::{create_router, AppState};
use econ_data_api::config::{Config, VERBOSE_LOG_FILTER};
use econ_data_api::datasets::Dataset;
use econ_data_api::metrics;
use econ_data_api::sources::{DataFile, Sources};
use econ_data_api::utils::shutdown_signal;

/// Economic data API.
#[derive(Parser, Debug)]
#[command(name = "econ-data-api")]
#[command(about = "Serve FRED, World Bank and local economic datasets as JSON")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Address to bind (overrides HOST).
        #[arg(long)]
        host: Option<String>,

        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Build one dataset and print its JSON to stdout.
    Fetch {
        /// Dataset name, e.g. `debt-balance`.
        dataset: Dataset,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let directives = match Config::load() {
        Ok(config) => config.log_filter(args.verbose),
        Err(_) if args.verbose => VERBOSE_LOG_FILTER.to_string(),
        Err(_) => "info".to_string(),
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Fetch { dataset }) => cmd_fetch(dataset).await,
        Some(Command::Serve { host, port }) => cmd_serve(host, port).await,
        None => cmd_serve(None, None).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ECONOMIC DATA API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Checking data directory... ");
    let files = Sources::from_config(&config)?.files;
    let mut missing = Vec::new();
    for file in DataFile::iter() {
        if !files.path(file).is_file() {
            missing.push(file);
        }
    }
    if missing.is_empty() {
        println!("OK");
    } else {
        println!("INCOMPLETE");
        for file in &missing {
            println!("  Missing: {}", files.path(*file).display());
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  FRED API URL: {}", config.fred_api_url);
    println!("  World Bank API URL: {}", config.worldbank_api_url);
    println!("  Data Directory: {}", config.data_dir.display());
    println!("  Listen Address: {}", config.bind_addr());
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Build one dataset and print it.
async fn cmd_fetch(dataset: Dataset) -> anyhow::Result<()> {
    let config = load_config()?;
    let sources = Sources::from_config(&config)?;

    info!(dataset = %dataset, remote = dataset.is_remote(), "Fetching dataset");
    let json = dataset.to_json(&sources).await?;
    println!("{}", json);

    Ok(())
}

/// Run the HTTP server until shutdown.
async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    // Override with CLI args if provided
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Data directory: {}", config.data_dir.display());

    if config.metrics_enabled {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        metrics::install_exporter(metrics_addr)?;
    }

    let sources = Sources::from_config(&config)?;
    let router = create_router(AppState::new(sources));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
