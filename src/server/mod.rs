use crate::config::Config;
use crate::fields::FieldRegistry;
use crate::hooks::HookRegistry;
use crate::store::{DbMetaStore, MetaStore};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use videometa_db::pool::DbPool;

pub mod auth;
pub mod error;
pub mod routes_items;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub db: DbPool,
    pub store: Arc<dyn MetaStore>,
    pub hooks: Arc<HookRegistry>,
    pub fields: Arc<FieldRegistry>,
}

impl AppContext {
    /// Wire the database-backed metadata store and the registered extensions.
    pub fn new(config: Config, db: DbPool) -> Self {
        let store: Arc<dyn MetaStore> = Arc::new(DbMetaStore::new(db.clone()));
        let extensions = crate::init_extensions(store.clone());

        Self {
            config: Arc::new(config),
            db,
            store,
            hooks: Arc::new(extensions.hooks),
            fields: Arc::new(extensions.fields),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = routes_items::item_routes().layer(middleware::from_fn_with_state(
        ctx.clone(),
        auth::principal_middleware,
    ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/wp/v2", api.clone())
        // Pretty-permalink prefix used by existing API clients
        .nest("/wp-json/wp/v2", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config, db: DbPool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    if !config.auth.enabled {
        tracing::warn!("Authentication is disabled; every request acts as an administrator");
    }

    let ctx = AppContext::new(config, db);
    let app = create_router(ctx);

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
