// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet routes, relayed to the Aptos wallet backend.

use crate::error::Result;
use crate::extract::ValidJson;
use crate::models::wallet::{
    AccountResponse, BalanceResponse, CreateAccountRequest, RewardRequest, TransactionResponse,
    TransferRequest,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/aptos/create-account", post(create_account))
        .route("/api/aptos/user/{user_id}", get(get_user))
        .route("/api/aptos/transfer", post(transfer))
        .route("/api/aptos/balance/{address}", get(balance))
        .route("/api/aptos/reward", post(reward))
}

async fn create_account(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<CreateAccountRequest>,
) -> Result<Json<AccountResponse>> {
    Ok(Json(state.aptos_client.create_account(&request).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AccountResponse>> {
    Ok(Json(state.aptos_client.get_user(&user_id).await?))
}

async fn transfer(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<TransferRequest>,
) -> Result<Json<TransactionResponse>> {
    Ok(Json(state.aptos_client.transfer(&request).await?))
}

async fn balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>> {
    Ok(Json(state.aptos_client.balance(&address).await?))
}

/// Pay a researcher from the platform account.
async fn reward(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<RewardRequest>,
) -> Result<Json<TransactionResponse>> {
    Ok(Json(state.aptos_client.reward(&request).await?))
}
