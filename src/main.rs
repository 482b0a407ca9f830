//! Main entry point for the Court Rotation service
//!
//! Loads configuration, initializes logging and serves the pairing commands
//! over HTTP until a shutdown signal arrives.

use anyhow::Result;
use clap::Parser;
use court_rotation::config::{validate_config, AppConfig};
use court_rotation::service::{AppState, HealthCheck, HttpServer, HttpServerConfig};
use court_rotation::OddParticipantPolicy;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// Court Rotation Service - Random one-on-one pairing for club sessions
#[derive(Parser)]
#[command(
    name = "court-rotation",
    version,
    about = "Pairs session participants onto courts and tracks their matches",
    long_about = "Court Rotation randomly pairs the participants present at a club session \
                 onto numbered courts, assigns who serves first, tracks each match from \
                 scheduled to completed and exports the fixtures as CSV."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Roster file override
    #[arg(long, value_name = "FILE", help = "JSON roster used when commands carry none")]
    roster: Option<PathBuf>,

    /// Seed for reproducible pairings
    #[arg(long, value_name = "SEED", help = "Seed the pairing generator")]
    seed: Option<u64>,

    /// Odd participant policy override
    #[arg(long, value_name = "POLICY", help = "Odd participant policy (queue, bye)")]
    policy: Option<OddParticipantPolicy>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Log run statistics periodically
async fn health_report_task(app_state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));

    loop {
        interval.tick().await;

        let health = HealthCheck::check(app_state.clone()).await;
        info!(
            "Health check: {} - {} matches ({} in progress, {} completed), {} queued",
            health.status,
            health.stats.matches,
            health.stats.in_progress,
            health.stats.completed,
            health.stats.queued
        );
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🏸 Court Rotation Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP: {}", config.http_addr());
    info!(
        "   Odd participant policy: {}",
        config.pairing.odd_participant_policy
    );
    match &config.pairing.roster_path {
        Some(path) => info!("   Roster: {}", path.display()),
        None => info!("   Roster: supplied per command"),
    }
    if let Some(seed) = config.pairing.rng_seed {
        info!("   Seed: {}", seed);
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(roster) = &args.roster {
        config.pairing.roster_path = Some(roster.clone());
    }

    if let Some(seed) = args.seed {
        config.pairing.rng_seed = Some(seed);
    }

    if let Some(policy) = args.policy {
        config.pairing.odd_participant_policy = policy;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let server = Arc::new(HttpServer::new(
        HttpServerConfig {
            host: config.service.http_host.clone(),
            port: config.service.http_port,
        },
        app_state.clone(),
    ));

    let server_task = {
        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = server.start().await {
                error!("HTTP server error: {:#}", e);
            }
        })
    };

    let health_task = tokio::spawn(health_report_task(app_state.clone()));

    info!("✅ Court Rotation Service is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    wait_for_shutdown_signal().await;

    info!("🛑 Shutdown signal received, beginning graceful shutdown...");

    health_task.abort();
    server.stop();

    match tokio::time::timeout(config.shutdown_timeout(), server_task).await {
        Ok(_) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("🛑 Court Rotation Service stopped");
    Ok(())
}
