use std::sync::Arc;

use anyhow::Context;
use espboard_core::{Dataset, ViewerSettings};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ViewerSettings::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| settings.log_filter().to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("ESP board viewer starting...");

    let data_dir = settings.data_dir();
    let dataset = Dataset::load(&data_dir)
        .with_context(|| format!("loading dataset from {}", data_dir.display()))?;

    let addr = settings.bind_addr()?;
    let app = espboard_web::create_router(Arc::new(dataset), settings.static_dir());
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("Viewer ready on http://{}", addr);
    tracing::info!("   Boards:     http://{}/api/boards/esp32", addr);
    tracing::info!("   Partitions: http://{}/api/partitions", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Viewer stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
