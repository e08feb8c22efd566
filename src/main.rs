use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod db;
mod generator;
mod internal_api;
mod model;
mod scenarios;
mod templates;
mod wizard;
mod ws;

use db::DBLayer;
use generator::Responder;
use ws::handler::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // -----------------------------
    // Shared state / Dependencies
    // -----------------------------
    let db_path = std::env::var("RETORT_DB_PATH").unwrap_or_else(|_| "retortdb".into());
    let db = Arc::new(DBLayer::new(&db_path)?);
    let responder = Arc::new(Responder::from_env());

    let state = AppState { db, responder };

    // -----------------------------
    // Routers
    // -----------------------------
    let app = Router::new()
        // WebSocket simulation view
        .merge(ws::ws_router())
        // Public API (home / intake / results views)
        .merge(api::api_router())
        // Internal API (server-only, debug instruments)
        .merge(internal_api::router())
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        // Attach shared state
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    info!(addr = addr.as_str(), db_path = db_path.as_str(), "retort listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
