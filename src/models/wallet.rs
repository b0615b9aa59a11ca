//! Wallet (Aptos backend) request and response contracts.
//!
//! These mirror the external wallet service; the gateway validates requests
//! and relays responses without interpreting them further.

use crate::extract::Normalize;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "receiverAddress is required"))]
    pub receiver_address: String,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
}

/// Platform-to-researcher reward payout.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RewardRequest {
    #[validate(length(min = 1, message = "receiver is required"))]
    pub receiver: String,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Normalize for CreateAccountRequest {
    fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }
}

impl Normalize for TransferRequest {
    fn normalize(&mut self) {
        self.receiver_address = self.receiver_address.trim().to_string();
    }
}

impl Normalize for RewardRequest {
    fn normalize(&mut self) {
        self.receiver = self.receiver.trim().to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WalletUser {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub wallet_address: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Response for account creation and user lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AccountResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub user: WalletUser,
}

/// Response for transfers and reward payouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TransactionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Transaction hash
    pub hash: String,
    /// Block explorer link for the transaction
    pub explorer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BalanceResponse {
    pub success: bool,
    pub address: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub balance_octas: u64,
    #[serde(rename = "balance_APT")]
    pub balance_apt: f64,
}
