// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! BiasBounty gateway: backend-for-frontend for the BiasBounty web app.
//!
//! This crate forwards dataset uploads to the bias detection service,
//! hands out stream URLs for long-running analysis jobs, and serves the
//! dataset and leaderboard APIs backed by Supabase, the marketplace backed
//! by MongoDB, and the wallet API relayed to the wallet service.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{MarketplaceStore, SupabaseDb};
use services::{AptosClient, BiasDetectionClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub marketplace: Arc<dyn MarketplaceStore>,
    pub bias_client: BiasDetectionClient,
    pub aptos_client: AptosClient,
}

impl AppState {
    /// Build state with upstream clients pointed at the configured services.
    pub fn new(config: Config, db: SupabaseDb, marketplace: Arc<dyn MarketplaceStore>) -> Self {
        let bias_client =
            BiasDetectionClient::new(config.bias_api_url.clone(), config.analysis_timeout);
        let aptos_client = AptosClient::new(&config.aptos_api_url);

        Self {
            config,
            db,
            marketplace,
            bias_client,
            aptos_client,
        }
    }
}
