use crate::server::{routes, static_files};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the Axum application
pub fn build_app(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(routes::health))
        // Model
        .route("/model", get(routes::model_status))
        .route("/model/reload", post(routes::reload_model))
        // Prediction
        .route("/predict", post(routes::predict))
        .route("/guide", get(routes::guide))
        // Dataset preview and training history
        .route("/dataset/preview", get(routes::dataset_preview))
        .route("/dataset/summary", get(routes::dataset_summary))
        .route("/dataset/histogram", get(routes::dataset_histogram))
        .route("/training", get(routes::training))
        // Statistics
        .route("/stats", get(routes::stats));

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(routes::prometheus_metrics))
        .fallback(static_files::serve_static)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until Ctrl+C or SIGTERM
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    if state.config.model.preload {
        let availability = state.shared_model().await;
        if let Some(model) = availability.model() {
            info!("Preloaded model {}", model.metadata().name);
        }
    }

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Cataract dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
