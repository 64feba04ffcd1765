use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, response::Html, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, API_PREFIX};
use crate::config::ServerConfig;
use crate::service::QueryService;

const INDEX: &str = "Welcome to the Weather API for Hawaii. Available endpoints:<br/>\
/api/v1.0/precipitation<br/>\
/api/v1.0/stations<br/>\
/api/v1.0/tobs<br/>\
/api/v1.0/&lt;start-date&gt;<br/>\
/api/v1.0/&lt;start-date&gt;/&lt;end-date&gt;<br/>";

/// Full application: index page plus the versioned API
pub fn app(service: Arc<QueryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .nest(API_PREFIX, api::router(service))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

pub async fn run(server: &ServerConfig, service: Arc<QueryService>) -> Result<()> {
    let addr = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received CTRL+C, shutting down");
}
