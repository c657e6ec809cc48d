use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_sieve::{
    config::Config,
    filter::AllowList,
    scheduler::RefreshScheduler,
    source::HttpPlaylistFetcher,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "m3u-sieve")]
#[command(version = "0.1.0")]
#[command(about = "Filters an upstream M3U playlist down to an allow list of channels")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("m3u_sieve={},tower_http=trace", cli.log_level)
    } else {
        format!("m3u_sieve={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting m3u-sieve v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    let mut config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    config.validate()?;
    info!(
        "Filtering {} against {} allowed channels",
        config.source.url,
        config.filter.allowed_tvg_ids.len()
    );

    let allow_list = Arc::new(AllowList::new(&config.filter.allowed_tvg_ids));
    let fetcher = Arc::new(HttpPlaylistFetcher::new(
        config.source.url.clone(),
        config.source.timeout,
    ));

    let shutdown = CancellationToken::new();

    // Cancel everything on SIGINT/SIGTERM
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    // Start the background refresh scheduler
    let scheduler = RefreshScheduler::new(
        fetcher.clone(),
        allow_list.clone(),
        config.storage.clone(),
        config.refresh.interval,
    );
    let scheduler_token = shutdown.clone();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_token).await;
    });

    let web_server = WebServer::new(AppState {
        config,
        fetcher,
        allow_list,
    })?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve_with_cancellation(shutdown.clone()).await?;

    shutdown.cancel();
    let _ = scheduler_handle.await;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down gracefully");
    }
}
