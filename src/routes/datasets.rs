// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dataset, leaderboard and user stats routes.

use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::models::{Dataset, LeaderboardEntry, NewDataset, UserStats};
use crate::routes::query_or_bad_request;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const MAX_LIMIT: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/datasets", get(list_datasets).post(create_dataset))
        .route("/api/datasets/{id}", get(get_dataset))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/users/{id}/stats", get(get_user_stats))
}

// ─── Datasets ────────────────────────────────────────────────

#[derive(Deserialize)]
struct DatasetsQuery {
    #[serde(default = "default_datasets_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

fn default_datasets_limit() -> u32 {
    30
}

/// Reject a zero limit and cap large ones.
fn checked_limit(limit: u32) -> Result<u32> {
    if limit == 0 {
        return Err(AppError::BadRequest(
            "Invalid 'limit' parameter: must be at least 1".to_string(),
        ));
    }
    Ok(limit.min(MAX_LIMIT))
}

/// List datasets, newest first.
async fn list_datasets(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<DatasetsQuery>, QueryRejection>,
) -> Result<Json<Vec<Dataset>>> {
    let params = query_or_bad_request(query)?;
    let limit = checked_limit(params.limit)?;

    tracing::debug!(limit, offset = params.offset, "Fetching datasets");

    let datasets = state.db.list_datasets(limit, params.offset).await?;
    Ok(Json(datasets))
}

async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
) -> Result<Json<Dataset>> {
    state
        .db
        .get_dataset(&dataset_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Dataset not found".to_string()))
}

/// Register an uploaded dataset. It starts out `pending`.
async fn create_dataset(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<NewDataset>,
) -> Result<(StatusCode, Json<Dataset>)> {
    let dataset = state.db.insert_dataset(&payload).await?;

    tracing::info!(
        dataset_id = %dataset.id,
        uploaded_by = %dataset.uploaded_by,
        "Dataset registered"
    );

    Ok((StatusCode::CREATED, Json(dataset)))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    limit: u32,
}

fn default_leaderboard_limit() -> u32 {
    50
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let params = query_or_bad_request(query)?;
    let limit = checked_limit(params.limit)?;

    let entries = state.db.leaderboard(limit).await?;
    Ok(Json(entries))
}

// ─── User Stats ──────────────────────────────────────────────

/// Contribution counters for a user. Unknown users get all zeros.
async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>> {
    let stats = match state.db.user_stats(&user_id).await? {
        Some(stats) => stats,
        None => {
            tracing::debug!(user_id = %user_id, "No stats row for user");
            UserStats::empty(user_id)
        }
    };
    Ok(Json(stats))
}
