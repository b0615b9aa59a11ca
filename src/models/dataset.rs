// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dataset model for storage and API.

use crate::extract::Normalize;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Lifecycle of a dataset's bias analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    #[default]
    Pending,
    Analyzing,
    Completed,
    Failed,
}

/// Uploader profile embedded from the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Uploader {
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Dataset row in the `datasets` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub file_url: String,
    pub file_type: String,
    /// Size in bytes
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub file_size: u64,
    /// User ID of the uploader
    pub uploaded_by: String,
    pub bias_score: Option<f64>,
    /// Metric name to value, as reported by the bias detection service
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "Record<string, number | undefined> | null")
    )]
    pub fairness_metrics: Option<serde_json::Value>,
    pub status: DatasetStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<Uploader>,
}

/// Payload for registering an uploaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDataset {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "description is too long"))]
    pub description: String,
    #[validate(length(min = 1, message = "file_url is required"))]
    pub file_url: String,
    #[validate(length(min = 1, message = "file_type is required"))]
    pub file_type: String,
    pub file_size: u64,
    #[validate(length(min = 1, message = "uploaded_by is required"))]
    pub uploaded_by: String,
}

impl Normalize for NewDataset {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.uploaded_by = self.uploaded_by.trim().to_string();
    }
}

/// Row written to the `datasets` table on registration.
#[derive(Debug, Serialize)]
pub(crate) struct DatasetInsert<'a> {
    #[serde(flatten)]
    pub dataset: &'a NewDataset,
    pub status: DatasetStatus,
    pub created_at: String,
    pub updated_at: String,
}
