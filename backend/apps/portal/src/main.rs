//! Portal Server Entry Point
//!
//! Serves the prebuilt frontend behind the session gate.
//! Uses `anyhow` for startup errors; request-level errors are
//! `session::SessionError` rendered through `kernel::error::AppError`.

mod config;

use axum::{
    Json, Router,
    http::{self, Method, header},
    routing::get,
};
use platform::http_client::{HttpClientConfig, build_http_client};
use serde_json::{Value, json};
use session::{GoTrueClient, session_router, with_session_gate};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal=info,session=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Auth service client
    let http_client = build_http_client(&HttpClientConfig::default())?;
    let gotrue_config = config.gotrue()?;

    tracing::info!(
        auth_service = %gotrue_config.base_url,
        storage_key = %gotrue_config.storage_key,
        failure_policy = ?config.session.failure_policy,
        timeout_ms = config.session.validation_timeout_ms(),
        "Session gate configured"
    );

    let client = Arc::new(GoTrueClient::new(http_client, gotrue_config));
    let session_config = Arc::new(config.session.clone());

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Frontend pages, all behind the gate
    let pages = Router::new().fallback_service(ServeDir::new(&config.static_dir));

    // Build router
    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(session_router(client.clone(), session_config.clone()))
        .merge(with_session_gate(pages, client, session_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!(static_dir = %config.static_dir.display(), "Listening on {}", config.addr);

    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
