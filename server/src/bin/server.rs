//! Uptime streak server: serves the streak page and runs the scheduled jobs.

use tracing_subscriber::EnvFilter;

use streak_server::app::SharedState;
use streak_server::server;
use streak_server::shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting uptime streak server");

    let (db, config, dir) = streak_server::init_foundation()?;
    tracing::info!("Data directory: {}", dir.display());
    let state = SharedState::new(db, config)?;

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    streak_server::spawn_background_tasks(&state);

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    shutdown::graceful_shutdown(&state).await;

    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
