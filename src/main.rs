// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BiasBounty Gateway API Server
//!
//! Proxies dataset analysis to the bias detection service and serves the
//! web app's data APIs.

use biasbounty_gateway::{
    config::Config,
    db::{MongoMarketplace, SupabaseDb},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        bias_api = %config.bias_api_url,
        analysis_timeout_secs = config.analysis_timeout.as_secs(),
        "Starting BiasBounty gateway"
    );

    let db = SupabaseDb::new(&config.supabase_url, &config.supabase_key)?;
    let marketplace = MongoMarketplace::connect(&config.mongodb_uri).await?;

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, Arc::new(marketplace)));

    // Build router
    let app = biasbounty_gateway::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("biasbounty_gateway=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
