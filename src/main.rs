use anyhow::{anyhow, Result};
use clap::Parser;
use favicon_aggregator::{router, serve, AppState, ReqwestIconFetcher, ServerConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    if std::env::var("TOKIO_CONSOLE").is_ok() {
        console_subscriber::init();
        info!("tokio-console enabled on port 6669");
    } else {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,favicon_aggregator=debug"));
        fmt().with_env_filter(env_filter).with_target(true).init();
    }

    let config = ServerConfig::parse();

    let fetcher = ReqwestIconFetcher::new(config.fetch_timeout(), &config.user_agent)
        .map_err(|e| anyhow!("Failed to create HTTP client: {e}"))?;
    let state = AppState::new(Arc::new(fetcher));

    for source in state.sources.iter() {
        info!("Favicon source {}: {}", source.name, source.url_template);
    }

    let app = router(state);
    let addr = config.bind_addr();

    // Cancelled on Ctrl+C; the server drains in-flight requests before returning
    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, draining requests...");
                signal_token.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Server running on port {} (fetch timeout {}ms)",
        config.port, config.fetch_timeout_ms
    );

    serve(listener, app, cancellation_token).await?;

    info!("Clean shutdown complete");

    Ok(())
}
