//! DashSrv entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dashsrv::api::create_routes;
use dashsrv::app_state::connect_grid;
use dashsrv::demo_data::DemoTables;
use dashsrv::reset::ResetOrchestrator;
use dashsrv::store_guard::StoreGuard;
use dashsrv::{AppState, DashConfig};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "DashSrv - IoT dashboard demo service")]
struct Args {
    /// Configuration file path (yaml, toml or json)
    #[arg(short, long, value_name = "FILE", env = "DASHSRV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve,
    /// Validate and print the effective configuration
    Check,
    /// Reseed the configured shared (redis) grid once and exit
    ResetAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config =
        DashConfig::load_with(args.config.as_deref()).context("Failed to load configuration")?;

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Check => check_config(&config),
        Commands::ResetAll => {
            init_logging(&config)?;
            reset_once(config).await
        },
        Commands::Serve => {
            init_logging(&config)?;
            run_service(config).await
        },
    }
}

fn init_logging(config: &DashConfig) -> anyhow::Result<()> {
    common::logging::init_with_config(config.log_config())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

async fn run_service(config: DashConfig) -> anyhow::Result<()> {
    info!("Starting DashSrv v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.listen_addr();
    let reset_on_start = config.bootstrap.reset_on_start;
    let state = Arc::new(AppState::from_config(config).await?);

    if reset_on_start {
        let report = state.reset.reset_all().await?;
        info!(
            facilities = report.facilities,
            customers = report.customers,
            "Demo data seeded"
        );
    } else {
        warn!("Startup reset disabled, serving existing grid contents");
    }

    let app = create_routes(state.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("API: http://{}/utils", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await;

    state.relay.shutdown().await;

    if let Err(e) = served {
        error!("Server error: {}", e);
        return Err(e.into());
    }
    info!("DashSrv stopped");
    Ok(())
}

async fn reset_once(config: DashConfig) -> anyhow::Result<()> {
    config.ensure_shared_grid()?;
    let grid = connect_grid(&config).await?;
    let orchestrator =
        ResetOrchestrator::new(grid, Arc::new(StoreGuard::new()), DemoTables::standard());
    let report = orchestrator.reset_all().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn check_config(config: &DashConfig) -> anyhow::Result<()> {
    println!("=== DashSrv configuration check ===\n");
    println!("✓ Configuration valid");
    println!("\n--- Service ---");
    println!("Name:    {}", config.service.name);
    println!("Listen:  {}", config.listen_addr());
    println!("\n--- Grid ---");
    println!("Backend: {:?}", config.grid.backend);
    println!("Prefix:  {}", config.grid.key_prefix);
    println!("\n--- Alerts ---");
    println!("Mode:    {:?}", config.alerts.mode);
    println!(
        "MQTT:    {}:{} (client {}, qos {})",
        config.alerts.mqtt.host,
        config.alerts.mqtt.port,
        config.alerts.mqtt.client_id,
        config.alerts.mqtt.qos
    );
    println!("\n--- Behaviour ---");
    println!("Summaries:      {:?}", config.summaries.mode);
    println!("Broker check:   {}", config.health.check_broker);
    println!("Reset on start: {}", config.bootstrap.reset_on_start);
    println!("\n--- Effective configuration ---");
    println!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
