mod config;
mod errors;
mod export;
mod layout;
mod models;
mod preview;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::TextMetricsProvider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed or inconsistent layout values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pager API v{}", env!("CARGO_PKG_VERSION"));

    let page = &config.page;
    info!(
        width = page.page_width,
        height = page.page_height,
        budget = page.safe_content_height(),
        keep_header_with_first_item = page.keep_header_with_first_item,
        "Layout page config"
    );

    // Static font metrics stand in for a rendering engine; always ready.
    let provider = Arc::new(TextMetricsProvider::default());
    let state = AppState::new(&config, provider)?;

    // Evict idle preview sessions in the background.
    let previews = state.previews.clone();
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(previews.idle_ttl() / 2);
        loop {
            sweep.tick().await;
            previews.evict_idle().await;
        }
    });

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor's deployment host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
