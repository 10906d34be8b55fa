mod config;
mod constants;
mod domain;
mod routes;
mod services;
mod store;
#[cfg(test)]
mod test_support;

use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{Config, MediaBackend, StoreBackend};
use services::media::{CloudinaryClient, LocalMediaHost, MediaHost};
use store::{MemoryStore, PgStore, Store};

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn MediaHost>,
    /// Directory served under /media when the local media backend is active
    pub media_root: Option<PathBuf>,
    pub config: Config,
}

/// Attach state and the HTTP layers to the API routes
pub fn build_app(state: Arc<AppState>) -> Router {
    let allow_origin = match state
        .config
        .cors_allow_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(allow_origin);

    routes::build_routes()
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn build_store(config: &Config) -> Result<Arc<dyn Store>, sqlx::Error> {
    match config.store_backend {
        StoreBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = services::db::connect(config).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!(
                users = config.memory_seed_users.len(),
                "Using in-memory store; data is lost on restart"
            );
            Ok(Arc::new(MemoryStore::with_users(config.memory_seed_users.as_slice())))
        }
    }
}

fn build_media(
    config: &Config,
) -> Result<(Arc<dyn MediaHost>, Option<PathBuf>), services::media::MediaError> {
    match &config.media_backend {
        MediaBackend::Cloudinary(cloudinary) => {
            info!(cloud = %cloudinary.cloud_name, "Using Cloudinary media host");
            let client = CloudinaryClient::new(cloudinary.clone(), config.media_timeout)?;
            Ok((Arc::new(client), None))
        }
        MediaBackend::Local { root } => {
            info!(root = ?root, "Using local media host");
            Ok((Arc::new(LocalMediaHost::new(root.clone())), Some(root.clone())))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vidtube_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let store = build_store(&config).await?;
    let (media, media_root) = build_media(&config)?;
    tokio::fs::create_dir_all(&config.upload_staging_dir).await?;

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState {
        store,
        media,
        media_root,
        config,
    });
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
