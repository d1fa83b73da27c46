//! GreenGuard API Server
//!
//! Receives field sensor temperatures and serves station conditions with
//! fire-risk categories.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use greenguard_api::config::ServiceConfig;
use greenguard_api::state::AppState;
use greenguard_core::OpenMeteoConfig;

/// GreenGuard API Server
#[derive(Parser, Debug)]
#[command(name = "greenguard-api")]
#[command(about = "Sensor aggregation and fire-risk API server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5000", env = "GREENGUARD_LISTEN_ADDR")]
    listen: String,

    /// YAML file with the initial station set
    #[arg(long, env = "GREENGUARD_STATIONS_FILE")]
    stations_file: Option<PathBuf>,

    /// Seconds between external refresh passes
    #[arg(long, default_value = "300", env = "GREENGUARD_REFRESH_SECS")]
    refresh_secs: u64,

    /// Timeout for each external conditions request, in seconds
    #[arg(long, default_value = "5", env = "GREENGUARD_FETCH_TIMEOUT_SECS")]
    fetch_timeout_secs: u64,

    /// Stations fetched concurrently during a refresh pass
    #[arg(long, default_value = "8", env = "GREENGUARD_MAX_CONCURRENT_FETCHES")]
    max_concurrent_fetches: usize,

    /// Weather API endpoint
    #[arg(
        long,
        default_value = "https://api.open-meteo.com/v1/forecast",
        env = "GREENGUARD_WEATHER_URL"
    )]
    weather_url: String,

    /// Air quality API endpoint
    #[arg(
        long,
        default_value = "https://air-quality-api.open-meteo.com/v1/air-quality",
        env = "GREENGUARD_AIR_QUALITY_URL"
    )]
    air_quality_url: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            stations_file: self.stations_file.clone(),
            refresh_interval: Duration::from_secs(self.refresh_secs),
            max_concurrent_fetches: self.max_concurrent_fetches,
            open_meteo: OpenMeteoConfig {
                weather_url: self.weather_url.clone(),
                air_quality_url: self.air_quality_url.clone(),
                timeout: Duration::from_secs(self.fetch_timeout_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting GreenGuard API server");

    let prometheus = greenguard_api::metrics::install_recorder()?;

    let state = match AppState::new(&args.service_config()) {
        Ok(state) => Arc::new(state.with_prometheus(prometheus)),
        Err(e) => {
            tracing::error!("Failed to initialize application state: {:#}", e);
            std::process::exit(1);
        }
    };

    let app = greenguard_api::build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("GreenGuard API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
