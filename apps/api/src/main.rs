mod applications;
mod config;
mod dashboard;
mod documents;
mod errors;
mod extraction;
mod jobs;
mod matching;
mod models;
mod resumes;
mod routes;
mod state;
mod storage;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::Dictionary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-ranker API v{}", env!("CARGO_PKG_VERSION"));

    let dictionary = Dictionary::load(config.dictionary_path.as_deref())?;
    info!(
        skills = dictionary.skills.len(),
        overrides = ?config.dictionary_path,
        "keyword dictionary loaded"
    );

    let state = AppState::new(config.clone(), dictionary)?;
    info!(data_dir = %config.data_dir.display(), "storage ready");

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::permissive().allow_origin(
            origin
                .parse::<HeaderValue>()
                .context("CORS_ORIGIN must be a valid header value")?,
        ),
        None => CorsLayer::permissive(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
