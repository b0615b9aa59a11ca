// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase client wrapper with typed operations over the PostgREST API.
//!
//! Provides high-level operations for:
//! - Datasets (registration, listing, analysis status)
//! - Leaderboard and user stats views

use crate::db::tables;
use crate::error::AppError;
use crate::models::dataset::DatasetInsert;
use crate::models::{
    now_rfc3339, Dataset, DatasetStatus, LeaderboardEntry, NewDataset, UserStats,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Dataset projection with the uploader's public profile embedded.
const DATASET_SELECT: &str = "*,uploader:users(username,avatar_url)";

type Filters<'a> = Vec<(&'a str, String)>;

/// Supabase database client.
#[derive(Clone)]
pub struct SupabaseDb {
    client: Option<RestClient>,
}

#[derive(Clone)]
struct RestClient {
    http: reqwest::Client,
    rest_url: String,
}

impl SupabaseDb {
    /// Create a client for the project at `url`, authenticating with `api_key`.
    pub fn new(url: &str, api_key: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| AppError::Database("Supabase key is not a valid header".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| AppError::Database("Supabase key is not a valid header".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to build Supabase client: {}", e))
            })?;

        tracing::info!(url, "Supabase client configured");

        Ok(Self {
            client: Some(RestClient {
                http,
                rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            }),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&RestClient, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Dataset Operations ──────────────────────────────────────

    /// Set a dataset's analysis status. Unknown IDs are a no-op.
    pub async fn update_dataset_status(
        &self,
        dataset_id: &str,
        status: DatasetStatus,
    ) -> Result<(), AppError> {
        let body = serde_json::json!({
            "status": status,
            "updated_at": now_rfc3339(),
        });
        let updated: Vec<serde_json::Value> = self
            .get_client()?
            .update(tables::DATASETS, vec![("id", eq(dataset_id))], &body)
            .await?;

        if updated.is_empty() {
            tracing::debug!(dataset_id, "Status update matched no dataset");
        }
        Ok(())
    }

    /// Newest datasets first.
    pub async fn list_datasets(&self, limit: u32, offset: u32) -> Result<Vec<Dataset>, AppError> {
        self.get_client()?
            .select(
                tables::DATASETS,
                vec![
                    ("select", DATASET_SELECT.to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await
    }

    /// Get a dataset by ID.
    pub async fn get_dataset(&self, dataset_id: &str) -> Result<Option<Dataset>, AppError> {
        let rows: Vec<Dataset> = self
            .get_client()?
            .select(
                tables::DATASETS,
                vec![
                    ("select", DATASET_SELECT.to_string()),
                    ("id", eq(dataset_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Register a new dataset in `pending` state.
    pub async fn insert_dataset(&self, dataset: &NewDataset) -> Result<Dataset, AppError> {
        let now = now_rfc3339();
        let row = DatasetInsert {
            dataset,
            status: DatasetStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };
        self.get_client()?.insert(tables::DATASETS, &row).await
    }

    // ─── Leaderboard & Stats ─────────────────────────────────────

    /// Top of `leaderboard_view`, in rank order.
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.get_client()?
            .select(
                tables::LEADERBOARD_VIEW,
                vec![
                    ("order", "rank.asc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
    }

    /// Contribution counters for a user, if the user exists.
    pub async fn user_stats(&self, user_id: &str) -> Result<Option<UserStats>, AppError> {
        let rows: Vec<UserStats> = self
            .get_client()?
            .select(
                tables::USER_STATS_VIEW,
                vec![
                    (
                        "select",
                        "user_id,points,datasets_uploaded,reports_submitted,bias_found".to_string(),
                    ),
                    ("user_id", eq(user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

/// PostgREST equality filter value.
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl RestClient {
    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Filters<'_>,
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(&filters)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_response_json(response).await
    }

    /// Insert one row and return its stored representation.
    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows: Vec<T> = check_response_json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Database(format!("Insert into {} returned no row", table)))
    }

    /// Patch matching rows and return them.
    async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Filters<'_>,
        patch: &B,
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .http
            .patch(self.table_url(table))
            .query(&filters)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Database(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))
}
