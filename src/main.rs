//! Remote Event Receiver Server - Main Entry Point

use anyhow::Result;
use tracing::info;

use rer_server::api::{create_router, AppState};
use rer_server::config::Config;
use rer_server::platform::memory::MemoryPlatform;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rer_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Remote Event Receiver Server"
    );

    // In-memory platform backend; the hosted platform supplies the real
    // object model in production deployments.
    let platform = MemoryPlatform::new();
    let list_id = platform.create_list(&config.target_list);
    info!(list = %list_id, name = %config.target_list, "Seeded target list");

    let state = AppState::new(platform, config.clone());
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
