// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet backend (Aptos) client for accounts, balances and payouts.

use crate::error::AppError;
use crate::models::wallet::{
    AccountResponse, BalanceResponse, CreateAccountRequest, RewardRequest, TransactionResponse,
    TransferRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Aptos wallet API client.
#[derive(Clone)]
pub struct AptosClient {
    http: reqwest::Client,
    base_url: String,
}

impl AptosClient {
    /// Create a client for the wallet backend hosted at `api_url`.
    pub fn new(api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/api/aptos", api_url.trim_end_matches('/')),
        }
    }

    /// Create a new on-chain account for a platform user.
    pub async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<AccountResponse, AppError> {
        self.post_json("create-account", request).await
    }

    /// Get wallet details for a platform user.
    pub async fn get_user(&self, user_id: &str) -> Result<AccountResponse, AppError> {
        self.get_json(&format!("user/{}", urlencoding::encode(user_id)))
            .await
    }

    /// Transfer APT from a user's account.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransactionResponse, AppError> {
        tracing::info!(
            user_id = %request.user_id,
            receiver = %request.receiver_address,
            amount = request.amount,
            "Wallet transfer"
        );
        self.post_json("transfer", request).await
    }

    /// Check the APT balance of an address.
    pub async fn balance(&self, address: &str) -> Result<BalanceResponse, AppError> {
        self.get_json(&format!("balance/{}", urlencoding::encode(address)))
            .await
    }

    /// Pay a reward from the platform account.
    pub async fn reward(&self, request: &RewardRequest) -> Result<TransactionResponse, AppError> {
        tracing::info!(
            receiver = %request.receiver,
            amount = request.amount,
            reason = ?request.reason,
            "Wallet reward payout"
        );
        self.post_json("reward", request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .send()
            .await
            .map_err(transport_error)?;

        check_response_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        check_response_json(response).await
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    tracing::error!(error = %err, "Wallet backend unreachable");
    AppError::Wallet {
        status: 502,
        message: err.to_string(),
    }
}

/// Check response status and parse the JSON body.
///
/// Failures carry the backend's `error` field when it sends one.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Wallet backend error");
        return Err(AppError::Wallet {
            status: status.as_u16(),
            message: error_message(&body, status),
        });
    }

    response.json().await.map_err(|e| AppError::Wallet {
        status: 502,
        message: format!("Invalid wallet response: {}", e),
    })
}

/// Prefer the backend's `error`, then its `message`, then the raw body.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let json = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = |name: &str| {
        json.as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    field("error")
        .or_else(|| field("message"))
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Wallet request failed")
                .to_string()
        })
}
