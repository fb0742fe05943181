// Main entry point - Dependency injection and client startup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::live_update::LiveUpdateChannel;
use crate::application::refresh_service::{spawn_refresh_worker, RefreshService};
use crate::infrastructure::config::load_client_config;
use crate::infrastructure::file_snapshot_store::FileSnapshotStore;
use crate::infrastructure::http_dataset_source::HttpDatasetSource;
use crate::infrastructure::websocket::{Backoff, ReconnectingWebSocket};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;
use crate::presentation::surface::DashboardSurface;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_client_config()?;

    // Adapters (infrastructure layer)
    let store = Arc::new(FileSnapshotStore::new(&config.storage.dir, &config.storage.key));
    let source = Arc::new(HttpDatasetSource::new(
        config.server.table_url(),
        config.server.request_timeout(),
    )?);
    let transport = Arc::new(ReconnectingWebSocket::new(
        config.server.notify_url(),
        Backoff::from_settings(&config.reconnect),
    ));

    // Rendered surface (presentation layer)
    let surface = DashboardSurface::new(config.viewer.auto_reload_secs);
    let view = Arc::new(surface.clone());

    // Refresh protocol (application layer)
    let refresh_service = RefreshService::new(
        source,
        store.clone(),
        view.clone(),
        config.render.mode,
        config.render.change_detection,
    );
    let (trigger, refresh_task) = spawn_refresh_worker(refresh_service);
    if config.render.refresh_on_start {
        trigger.fire();
    }
    let channel = LiveUpdateChannel::open(transport, view, trigger);

    tracing::info!(
        table = %config.server.table_url(),
        notify = %config.server.notify_url(),
        snapshot = %store.path().display(),
        mode = ?config.render.mode,
        "Starting webperf3 client"
    );

    // Local viewer
    let app = router(Arc::new(AppState { surface }));
    let listener = tokio::net::TcpListener::bind(config.viewer.listen).await?;
    tracing::info!("Serving dashboard on http://{}", config.viewer.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Closing the channel drops the last trigger, which lets the worker finish.
    channel.close().await;
    let _ = refresh_task.await;
    tracing::info!("webperf3 client stopped");

    Ok(())
}
