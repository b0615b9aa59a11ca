// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace routes: dataset files posted by clients and worker submissions,
//! stored in MongoDB.

use crate::error::{AppError, Result};
use crate::extract::{Normalize, ValidJson};
use crate::models::marketplace::SubmissionPatch;
use crate::models::{FileDoc, NewFile, NewSubmission, Submission, SubmissionStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Files returned when the requested count is not a positive number.
const DEFAULT_FILES_LIMIT: u32 = 10;
const MAX_FILES_LIMIT: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/files", post(create_file))
        .route("/api/files/{limit}", get(recent_files))
        .route("/api/submissions", post(create_submission))
        .route("/api/submissions/{id}/status", patch(update_status))
        .route("/api/submissions/{id}/submit", patch(submit_work))
        .route("/api/submissions/{id}/reward-claimed", patch(mark_reward_claimed))
        .route("/api/submissions/worker/{worker_id}", get(worker_submissions))
        .route("/api/submissions/client/{client_id}", get(client_submissions))
}

// ─── Files ───────────────────────────────────────────────────

async fn create_file(
    State(state): State<Arc<AppState>>,
    ValidJson(file): ValidJson<NewFile>,
) -> Result<(StatusCode, Json<FileDoc>)> {
    let created = state.marketplace.insert_file(&file).await?;
    tracing::info!(file_id = %created.id, user_id = %created.user_id, "Marketplace file stored");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Parse the path count; anything that is not a positive integer means the
/// default.
fn files_limit(raw: &str) -> u32 {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .map(|n| n.min(MAX_FILES_LIMIT))
        .unwrap_or(DEFAULT_FILES_LIMIT)
}

async fn recent_files(
    State(state): State<Arc<AppState>>,
    Path(limit): Path<String>,
) -> Result<Json<Vec<FileDoc>>> {
    let files = state.marketplace.recent_files(files_limit(&limit)).await?;
    Ok(Json(files))
}

// ─── Submissions ─────────────────────────────────────────────

async fn create_submission(
    State(state): State<Arc<AppState>>,
    ValidJson(submission): ValidJson<NewSubmission>,
) -> Result<(StatusCode, Json<Submission>)> {
    let created = state.marketplace.insert_submission(&submission).await?;
    tracing::info!(
        submission_id = %created.id,
        worker_id = %created.worker_id,
        dataset_id = %created.dataset_id,
        "Submission created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize, Validate)]
struct StatusUpdate {
    #[validate(required(message = "status is required"))]
    status: Option<SubmissionStatus>,
}

impl Normalize for StatusUpdate {}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SubmitWork {
    #[validate(
        required(message = "submissionLink is required"),
        length(min = 1, message = "submissionLink is required")
    )]
    submission_link: Option<String>,
    notes: Option<String>,
}

impl Normalize for SubmitWork {
    fn normalize(&mut self) {
        if let Some(link) = self.submission_link.as_mut() {
            *link = link.trim().to_string();
        }
    }
}

/// Apply a patch, mapping a missing row to `404`.
async fn apply_patch(
    state: &AppState,
    submission_id: &str,
    patch: SubmissionPatch,
) -> Result<Json<Submission>> {
    state
        .marketplace
        .update_submission(submission_id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
    ValidJson(update): ValidJson<StatusUpdate>,
) -> Result<Json<Submission>> {
    tracing::info!(submission_id = %submission_id, status = ?update.status, "Updating submission status");

    let patch = SubmissionPatch {
        status: update.status,
        ..Default::default()
    };
    apply_patch(&state, &submission_id, patch).await
}

/// Record delivered work and move the submission to `submitted`.
async fn submit_work(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
    ValidJson(work): ValidJson<SubmitWork>,
) -> Result<Json<Submission>> {
    let patch = SubmissionPatch {
        status: Some(SubmissionStatus::Submitted),
        submission_link: work.submission_link,
        notes: work.notes,
        ..Default::default()
    };
    apply_patch(&state, &submission_id, patch).await
}

async fn mark_reward_claimed(
    State(state): State<Arc<AppState>>,
    Path(submission_id): Path<String>,
) -> Result<Json<Submission>> {
    let patch = SubmissionPatch {
        reward_claimed: Some(true),
        ..Default::default()
    };
    apply_patch(&state, &submission_id, patch).await
}

async fn worker_submissions(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
) -> Result<Json<Vec<Submission>>> {
    Ok(Json(state.marketplace.submissions_by_worker(&worker_id).await?))
}

async fn client_submissions(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<Submission>>> {
    Ok(Json(state.marketplace.submissions_by_client(&client_id).await?))
}
