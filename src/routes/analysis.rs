// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analysis routes: synchronous upload analysis and stream job triggers.

use crate::error::{AppError, Result};
use crate::models::DatasetStatus;
use crate::services::UploadedFile;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Multipart field carrying the dataset.
const FILE_FIELD: &str = "file";

/// Filename used when the client sends a nameless blob.
const DEFAULT_FILE_NAME: &str = "blob";

/// Analysis routes. Upload size is bounded by `max_upload_bytes`.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/analyze",
            post(analyze).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/analyze-bias", post(analyze_bias))
}

// ─── Upload Analysis ─────────────────────────────────────────

/// Forward an uploaded dataset to the bias detection service and return
/// its analysis.
async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Analyze request is not multipart");
        AppError::BadRequest(rejection.body_text())
    })?;

    let file = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let analysis = state.bias_client.analyze_upload(file).await?;
    Ok(Json(analysis))
}

/// Find the `file` field, skipping any others.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "Malformed multipart body");
        AppError::BadRequest(e.body_text())
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

// ─── Stream Job Trigger ──────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBiasRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    dataset_id: Option<String>,
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    file_type: Option<String>,
}

/// Dataset IDs arrive as strings or plain numbers depending on the table.
/// A numeric zero is treated as absent.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        },
    )
}

/// Stream job handle returned to the browser.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBiasResponse {
    pub success: bool,
    pub sse_url: String,
}

/// Mark a stored dataset as analyzing and return the event stream URL the
/// browser should subscribe to for progress.
async fn analyze_bias(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalyzeBiasResponse>> {
    let request: AnalyzeBiasRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Invalid analyze-bias body");
        AppError::BadRequest("Invalid JSON body".to_string())
    })?;

    let (Some(dataset_id), Some(file_url)) = (
        request.dataset_id.filter(|id| !id.is_empty()),
        request.file_url.filter(|url| !url.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Missing required parameters".to_string(),
        ));
    };

    state
        .db
        .update_dataset_status(&dataset_id, DatasetStatus::Analyzing)
        .await?;

    let sse_url = state
        .bias_client
        .sse_url(&dataset_id, &file_url, request.file_type.as_deref());

    tracing::info!(dataset_id = %dataset_id, "Dataset analysis triggered");

    Ok(Json(AnalyzeBiasResponse {
        success: true,
        sse_url,
    }))
}
