// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bias detection service client.
//!
//! Handles:
//! - Forwarding uploaded datasets to `/analyze-upload`, bounded by a timeout
//! - Rewriting relative download links into absolute ones
//! - Building the `/process-sse` stream URL the browser subscribes to

use crate::error::AppError;
use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Shown when the service does not answer in time; first requests after a
/// cold start wait for model loading.
pub const ANALYSIS_TIMEOUT_MESSAGE: &str = "Analysis timeout. Backend may be loading AI models (first time takes 5-10 minutes). Please try again in a moment.";

/// Relayed when the service fails without an explanation.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Upstream analysis failed";

/// File type assumed for stream jobs when the client does not send one.
pub const DEFAULT_FILE_TYPE: &str = "text/csv";

/// A file received from the client, ready to forward.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Bias detection API client.
#[derive(Clone)]
pub struct BiasDetectionClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl BiasDetectionClient {
    /// Create a client for the service at `base_url` (no trailing slash).
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    /// Run a synchronous analysis of an uploaded file.
    ///
    /// The whole exchange, including reading the response body, must finish
    /// within the configured timeout.
    pub async fn analyze_upload(&self, file: UploadedFile) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/analyze-upload", self.base_url);
        let file_name = file.file_name.clone();
        let size = file.bytes.len();

        tracing::info!(file_name = %file_name, size, "Forwarding upload for analysis");

        let exchange = async {
            let form = Form::new().part("file", file_part(file));
            let response = self
                .http
                .post(&url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| AppError::AnalysisFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), body = %body, "Upstream analysis failed");
                let message = if body.trim().is_empty() {
                    UPSTREAM_FAILURE_MESSAGE.to_string()
                } else {
                    body
                };
                return Err(AppError::Upstream {
                    status: status.as_u16(),
                    message,
                });
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| AppError::AnalysisFailed(format!("JSON parse error: {}", e)))
        };

        let mut analysis = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                tracing::warn!(
                    file_name = %file_name,
                    timeout_secs = self.timeout.as_secs(),
                    "Upload analysis timed out"
                );
                AppError::Timeout(ANALYSIS_TIMEOUT_MESSAGE.to_string())
            })??;

        absolutize_download_url(&mut analysis, &self.base_url);
        Ok(analysis)
    }

    /// URL of the server-sent-events job that analyzes a stored dataset.
    pub fn sse_url(&self, dataset_id: &str, file_url: &str, file_type: Option<&str>) -> String {
        let file_type = file_type
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_FILE_TYPE);

        format!(
            "{}/process-sse?dataset_id={}&file_url={}&file_type={}",
            self.base_url,
            urlencoding::encode(dataset_id),
            urlencoding::encode(file_url),
            urlencoding::encode(file_type)
        )
    }
}

/// Build the multipart part, dropping a content type reqwest cannot parse.
fn file_part(file: UploadedFile) -> Part {
    let UploadedFile {
        file_name,
        content_type,
        bytes,
    } = file;
    let len = bytes.len() as u64;
    let part = Part::stream_with_length(bytes.clone(), len).file_name(file_name.clone());

    match content_type {
        Some(content_type) => part.mime_str(&content_type).unwrap_or_else(|_| {
            tracing::warn!(content_type = %content_type, "Ignoring invalid upload content type");
            Part::stream_with_length(bytes, len).file_name(file_name)
        }),
        None => part,
    }
}

/// Prefix a relative `download_url` with the service base URL.
pub fn absolutize_download_url(analysis: &mut serde_json::Value, base_url: &str) {
    if let Some(download_url) = analysis
        .get_mut("download_url")
        .filter(|v| v.as_str().is_some_and(|url| !url.starts_with("http")))
    {
        let absolute = format!("{}{}", base_url, download_url.as_str().unwrap_or_default());
        *download_url = serde_json::Value::String(absolute);
    }
}
