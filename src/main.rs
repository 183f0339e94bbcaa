use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use market_gateway::config::{self, GatewayConfig};
use market_gateway::http::HttpServer;
use market_gateway::lifecycle::{self, signals, Shutdown};
use market_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "market-gateway")]
#[command(about = "Rate-limited market data and prediction gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut config = GatewayConfig::default();
            config::loader::apply_env(&mut config);
            config
        }
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("market-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        symbols = config.refresh.symbols.len(),
        refresh_interval_secs = config.refresh.interval_secs,
        stale_policy = ?config.refresh.stale_policy,
        rate_limiting = config.rate_limit.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let state = lifecycle::build_state(&config)?;
    let shutdown = Shutdown::new();
    signals::trigger_on_signal(shutdown.clone());

    let tasks = lifecycle::spawn_background_tasks(&config, &state, &shutdown);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
