use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub mod config;
pub mod convert;
pub mod error;
pub mod handlers;
pub mod state;
pub mod upstream;

pub use config::GatewayConfig;
pub use state::AppState;

use convert::SimplifiedChinese;
use upstream::NewsDataClient;

pub fn create_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::permissive();

    let mut app = Router::new()
        .route("/api/news", get(handlers::get_news))
        .route("/healthz", get(handlers::healthz))
        .with_state(Arc::new(state));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors)
}

/// Builds the gateway against the real news API and serves it until the
/// process is interrupted.
pub async fn serve(config: GatewayConfig) -> nf_core::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let static_dir = config.static_dir.clone();
    let fallback = config.fallback.clone();
    info!(?config, "🛰️ Starting news gateway");

    let upstream = Arc::new(NewsDataClient::new(config)?);
    let state = AppState::new(upstream, Arc::new(SimplifiedChinese)).with_fallback(fallback);
    let app = create_app(state, static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Gateway listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

pub mod prelude {
    pub use crate::convert::{Passthrough, ScriptConverter, SimplifiedChinese};
    pub use crate::upstream::{NewsDataClient, UpstreamSearch};
    pub use crate::{create_app, AppState, GatewayConfig};
    pub use nf_core::{Error, Result};
}
