//! HTTP layer: shared context, router construction, and server startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use galleria_db::pool::DbPool;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::gallery::GalleryService;
use crate::store::ObjectStore;

pub mod routes_images;

/// Largest accepted request body; uploads are whole images in memory.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared application context
///
/// Cheaply cloneable; every field is an `Arc` or a pool handle.
#[derive(Clone)]
pub struct AppContext {
    /// Upload/delete coordinator.
    pub gallery: Arc<GalleryService>,
    /// Object store, used directly by the image-serving route.
    pub store: Arc<dyn ObjectStore>,
    /// Database connection pool.
    pub db_pool: DbPool,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = cors_layer(&ctx.config);

    let api = Router::new()
        .route("/health", get(api_health))
        .merge(routes_images::image_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Serve static files if directory is provided
    // Uses SPA fallback: serves index.html for any route that doesn't match a file
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match &config.server.cors_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Invalid cors_origin {origin:?}, allowing any origin");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn api_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Start the HTTP server
pub async fn start_server(
    config: Config,
    db_pool: DbPool,
    store: Arc<dyn ObjectStore>,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let gallery = Arc::new(GalleryService::new(store.clone(), db_pool.clone()));

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext {
        gallery,
        store,
        db_pool,
        config: Arc::new(config),
    };

    let app = create_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
