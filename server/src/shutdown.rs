use std::time::Duration;

use tokio::time::sleep;

use crate::app::SharedState;

pub async fn graceful_shutdown(state: &SharedState) {
    tracing::info!("Shutdown sequence started");

    state.shutdown_token().cancel();
    tracing::info!("Shutdown: background loops and server cancelled");

    // Give in-flight job ticks a moment to finish their store writes.
    sleep(Duration::from_millis(200)).await;
    tracing::info!("Shutdown sequence completed");
}
