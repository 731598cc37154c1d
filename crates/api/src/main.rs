use std::net::SocketAddr;
use std::sync::Arc;

use hookecho_core::clock::{Clock, SystemClock};
use hookecho_events::{HttpCallbackSender, TokioScheduler};
use hookecho_store::FileCallbackStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hookecho_api::config::ServerConfig;
use hookecho_api::router::build_app_router;
use hookecho_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "hookecho_api=debug,hookecho_store=debug,hookecho_events=debug,tower_http=debug"
                        .into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        callback_dir = %config.callback_dir.display(),
        callback_delay_secs = config.callback_delay.as_secs(),
        "Loaded server configuration"
    );

    // --- Callback storage ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = FileCallbackStore::new(config.callback_dir.clone(), Arc::clone(&clock));
    store
        .ensure_dir()
        .await
        .expect("Failed to create callback storage directory");
    tracing::info!("Callback storage ready");

    // --- Deferred delivery ---
    let sender = HttpCallbackSender::new(config.callback_timeout)
        .expect("Failed to build callback HTTP client");
    let scheduler = Arc::new(TokioScheduler::new(Arc::new(sender)));
    tracing::info!("Callback scheduler started");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
        scheduler: scheduler.clone(),
        clock,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!(
        pending = scheduler.pending(),
        "Server stopped accepting connections, dropping pending callbacks"
    );
    scheduler.shutdown().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
