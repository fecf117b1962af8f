//! Forum URLs - pretty-URL rewriting service for forum links
//!
//! Serves rewritten links over HTTP, backed by an in-memory name store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forum_urls::api::create_router;
use forum_urls::{spawn_cleanup_task, AppState, Config, MemoryNameSource};

/// Main entry point for the URL service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the name store seed file, if any
/// 4. Create the name cache and link builder
/// 5. Start background bucket cleanup task
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum_urls=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Forum URL service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: bucket_size={}, rewrite_urls={}, base_script_file={}, port={}, cleanup_interval={}s",
        config.bucket_size,
        config.rewrite_urls,
        config.base_script_file,
        config.server_port,
        config.cleanup_interval
    );

    let source = load_names(&config)?;
    let state = AppState::from_config(&config, Arc::new(source));
    info!("Name cache initialized");

    let cleanup_handle = spawn_cleanup_task(state.names.clone(), config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Reads the seed file named by the config, or starts with an empty store.
fn load_names(config: &Config) -> anyhow::Result<MemoryNameSource> {
    let Some(path) = config.names_file.as_deref() else {
        warn!("NAMES_FILE not set, starting with an empty name store");
        return Ok(MemoryNameSource::new());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read names file {}", path))?;
    let source = MemoryNameSource::from_json(&json)
        .with_context(|| format!("failed to parse names file {}", path))?;
    info!("Loaded name store from {}", path);
    Ok(source)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
