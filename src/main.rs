//! Argus Binary Entry Point
//!
//! This binary runs the endpoint availability monitor. Core functionality is
//! provided by the `argus` library crate.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use argus::{
    CycleScheduler, DomainAggregator, HttpTransport, Prober, config::AppConfig,
    endpoint::build_specs,
};

/// Argus - HTTP Endpoint Availability Monitor
#[derive(Parser, Debug)]
#[command(name = "argus", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "ARGUS_CONFIG"
    )]
    config: String,

    /// Directory for rolling log files
    #[arg(long, default_value = "argus_logs", env = "ARGUS_LOG_DIR")]
    log_dir: String,

    /// Check-cycle period (overrides config file)
    #[arg(long, env = "ARGUS_PERIOD", value_parser = humantime::parse_duration)]
    period: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing: stdout plus a daily-rolling file in the log dir.
    let _guard = init_tracing(&cli.log_dir)?;

    tracing::info!("Argus - HTTP Endpoint Availability Monitor");

    // Load configuration from file
    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load(&cli.config)?;

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(period) = cli.period {
        config.monitor.period = period;
    }

    // Build validated endpoint specs; malformed records are excluded here,
    // once, before any cycle runs.
    let endpoints = build_specs(&config.endpoints);
    if endpoints.is_empty() {
        tracing::warn!("No valid endpoints configured, cycles will probe nothing");
    }

    tracing::info!(
        endpoints = endpoints.len(),
        period = %humantime::format_duration(config.monitor.period),
        probe_timeout = %humantime::format_duration(config.monitor.probe_timeout),
        "Monitor configured"
    );

    let transport = Arc::new(HttpTransport::new(config.monitor.probe_timeout)?);
    let prober = Prober::new(transport).with_timeout(config.monitor.probe_timeout);
    let aggregator = Arc::new(DomainAggregator::new());

    let scheduler = CycleScheduler::new(endpoints, prober, Arc::clone(&aggregator))
        .with_period(config.monitor.period);

    // Run until Ctrl+C / SIGTERM flips the shutdown flag.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(shutdown_signal(shutdown_tx));

    tracing::info!("Press Ctrl+C to shutdown");
    scheduler.run(shutdown_rx).await;

    // Last report so a stopped run ends with the cumulative numbers visible.
    for (domain, percentage) in aggregator.report() {
        tracing::info!(
            domain = %domain,
            availability_percentage = percentage,
            "Final cumulative availability"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Configure the subscriber; the returned guard must live for the whole run
/// so buffered file output is flushed on exit.
fn init_tracing(log_dir: &str) -> Result<WorkerGuard, std::io::Error> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "argus.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,argus=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }

    let _ = shutdown_tx.send(true);
}
