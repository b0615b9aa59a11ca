// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace models: dataset files posted by clients and the work
//! submissions made against them.

use crate::extract::Normalize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

// ─── Files ───────────────────────────────────────────────────

/// Payload for posting a dataset file to the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    /// Uploader (client) ID
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,
    #[validate(range(min = 0.0, message = "fileSize must not be negative"))]
    pub file_size: f64,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub file_type: String,
    #[validate(range(min = 0.0, message = "reward must not be negative"))]
    pub reward: Option<f64>,
    /// Optional cutoff for time-limited tasks
    pub deadline: Option<DateTime<Utc>>,
}

impl Normalize for NewFile {
    fn normalize(&mut self) {
        for field in [
            &mut self.user_id,
            &mut self.username,
            &mut self.title,
            &mut self.filename,
            &mut self.file_type,
        ] {
            trim_in_place(field);
        }
        self.email = self.email.trim().to_lowercase();
        if let Some(description) = self.description.as_mut() {
            trim_in_place(description);
        }
        self.reward.get_or_insert(0.0);
    }
}

/// Stored marketplace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FileDoc {
    /// Hex ObjectId
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub file_size: f64,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub reward: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: String,
    pub updated_at: String,
}

// ─── Submissions ─────────────────────────────────────────────

/// Progress of a worker's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    #[default]
    Applied,
    InProgress,
    Submitted,
    Approved,
    Rejected,
}

/// Payload for applying to work on a dataset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    #[validate(length(min = 1, message = "workerId is required"))]
    pub worker_id: String,
    #[validate(length(min = 1, message = "workerUsername is required"))]
    pub worker_username: String,
    /// Marketplace file ID
    #[validate(length(min = 1, message = "datasetId is required"))]
    pub dataset_id: String,
    /// Owner of the dataset
    #[validate(length(min = 1, message = "clientId is required"))]
    pub client_id: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub submission_link: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub reward_claimed: bool,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Normalize for NewSubmission {
    fn normalize(&mut self) {
        for field in [
            &mut self.worker_id,
            &mut self.worker_username,
            &mut self.dataset_id,
            &mut self.client_id,
        ] {
            trim_in_place(field);
        }
        for field in [self.submission_link.as_mut(), self.notes.as_mut()]
            .into_iter()
            .flatten()
        {
            trim_in_place(field);
        }
    }
}

/// Stored submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Hex ObjectId
    #[serde(rename = "_id")]
    pub id: String,
    pub worker_id: String,
    pub worker_username: String,
    pub dataset_id: String,
    pub client_id: String,
    pub status: SubmissionStatus,
    pub submission_link: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub reward_claimed: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update applied to a submission document.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_claimed: Option<bool>,
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
