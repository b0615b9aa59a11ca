// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB-backed marketplace store.
//!
//! Documents live in the `files` and `submissions` collections with
//! ObjectId `_id` keys and BSON `createdAt`/`updatedAt` timestamps.

use crate::db::collections;
use crate::db::marketplace::MarketplaceStore;
use crate::error::AppError;
use crate::models::marketplace::SubmissionPatch;
use crate::models::{FileDoc, NewFile, NewSubmission, Submission, SubmissionStatus};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};

/// Database used when the connection string does not name one.
pub const DEFAULT_DATABASE: &str = "hackspire";

/// Marketplace store over MongoDB.
#[derive(Clone)]
pub struct MongoMarketplace {
    db: Option<Database>,
}

impl MongoMarketplace {
    /// Create a client for `uri`. The connection itself is established lazily.
    pub async fn connect(uri: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create MongoDB client: {}", e))
        })?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        tracing::info!(database = %db.name(), "MongoDB client configured");

        Ok(Self { db: Some(db) })
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { db: None }
    }

    fn get_db(&self) -> Result<&Database, AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::Database("MongoDB not connected (offline mode)".to_string()))
    }

    fn files(&self) -> Result<Collection<FileRecord>, AppError> {
        Ok(self.get_db()?.collection(collections::FILES))
    }

    fn submissions(&self) -> Result<Collection<SubmissionRecord>, AppError> {
        Ok(self.get_db()?.collection(collections::SUBMISSIONS))
    }

    async fn submissions_where(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Submission>, AppError> {
        let mut filter = Document::new();
        filter.insert(field, value);

        let records: Vec<SubmissionRecord> = self
            .submissions()?
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(db_error)?
            .try_collect()
            .await
            .map_err(db_error)?;

        records.into_iter().map(SubmissionRecord::into_doc).collect()
    }
}

#[async_trait]
impl MarketplaceStore for MongoMarketplace {
    async fn insert_file(&self, file: &NewFile) -> Result<FileDoc, AppError> {
        let mut record = FileRecord::new(file, DateTime::now());
        let result = self
            .files()?
            .insert_one(&record)
            .await
            .map_err(db_error)?;
        record.id = result.inserted_id.as_object_id();
        record.into_doc()
    }

    async fn recent_files(&self, limit: u32) -> Result<Vec<FileDoc>, AppError> {
        let records: Vec<FileRecord> = self
            .files()?
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .limit(i64::from(limit))
            .await
            .map_err(db_error)?
            .try_collect()
            .await
            .map_err(db_error)?;

        records.into_iter().map(FileRecord::into_doc).collect()
    }

    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<Submission, AppError> {
        let mut record = SubmissionRecord::new(submission, DateTime::now());
        let result = self
            .submissions()?
            .insert_one(&record)
            .await
            .map_err(db_error)?;
        record.id = result.inserted_id.as_object_id();
        record.into_doc()
    }

    async fn update_submission(
        &self,
        submission_id: &str,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>, AppError> {
        // Not an ObjectId, so it cannot name a submission.
        let Ok(id) = ObjectId::parse_str(submission_id) else {
            return Ok(None);
        };

        let updated = self
            .submissions()?
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": patch_document(patch)? })
            .return_document(ReturnDocument::After)
            .await
            .map_err(db_error)?;

        updated.map(SubmissionRecord::into_doc).transpose()
    }

    async fn submissions_by_worker(&self, worker_id: &str) -> Result<Vec<Submission>, AppError> {
        self.submissions_where("workerId", worker_id).await
    }

    async fn submissions_by_client(&self, client_id: &str) -> Result<Vec<Submission>, AppError> {
        self.submissions_where("clientId", client_id).await
    }
}

fn db_error(err: mongodb::error::Error) -> AppError {
    AppError::Database(err.to_string())
}

/// `$set` body for a submission patch, bumping `updatedAt`.
fn patch_document(patch: &SubmissionPatch) -> Result<Document, AppError> {
    let mut set = bson::to_document(patch).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Failed to encode submission update: {}", e))
    })?;
    set.insert("updatedAt", DateTime::now());
    Ok(set)
}

// ─── Stored Documents ────────────────────────────────────────

fn to_bson_date(value: &chrono::DateTime<Utc>) -> DateTime {
    DateTime::from_millis(value.timestamp_millis())
}

fn to_chrono(value: DateTime) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

fn to_rfc3339(value: DateTime) -> String {
    to_chrono(value).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn object_id_hex(id: Option<ObjectId>) -> Result<String, AppError> {
    id.map(|id| id.to_hex())
        .ok_or_else(|| AppError::Database("Document has no ObjectId".to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    user_id: String,
    email: String,
    username: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    filename: String,
    file_size: f64,
    #[serde(rename = "type")]
    file_type: String,
    #[serde(default)]
    reward: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadline: Option<DateTime>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl FileRecord {
    fn new(file: &NewFile, now: DateTime) -> Self {
        Self {
            id: None,
            user_id: file.user_id.clone(),
            email: file.email.clone(),
            username: file.username.clone(),
            title: file.title.clone(),
            description: file.description.clone(),
            filename: file.filename.clone(),
            file_size: file.file_size,
            file_type: file.file_type.clone(),
            reward: file.reward.unwrap_or(0.0),
            deadline: file.deadline.as_ref().map(to_bson_date),
            created_at: now,
            updated_at: now,
        }
    }

    fn into_doc(self) -> Result<FileDoc, AppError> {
        Ok(FileDoc {
            id: object_id_hex(self.id)?,
            user_id: self.user_id,
            email: self.email,
            username: self.username,
            title: self.title,
            description: self.description,
            filename: self.filename,
            file_size: self.file_size,
            file_type: self.file_type,
            reward: self.reward,
            deadline: self.deadline.map(to_chrono),
            created_at: to_rfc3339(self.created_at),
            updated_at: to_rfc3339(self.updated_at),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    worker_id: String,
    worker_username: String,
    dataset_id: String,
    client_id: String,
    #[serde(default)]
    status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submission_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default)]
    reward_claimed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl SubmissionRecord {
    fn new(submission: &NewSubmission, now: DateTime) -> Self {
        Self {
            id: None,
            worker_id: submission.worker_id.clone(),
            worker_username: submission.worker_username.clone(),
            dataset_id: submission.dataset_id.clone(),
            client_id: submission.client_id.clone(),
            status: submission.status,
            submission_link: submission.submission_link.clone(),
            notes: submission.notes.clone(),
            reward_claimed: submission.reward_claimed,
            approved_at: submission.approved_at.as_ref().map(to_bson_date),
            created_at: now,
            updated_at: now,
        }
    }

    fn into_doc(self) -> Result<Submission, AppError> {
        Ok(Submission {
            id: object_id_hex(self.id)?,
            worker_id: self.worker_id,
            worker_username: self.worker_username,
            dataset_id: self.dataset_id,
            client_id: self.client_id,
            status: self.status,
            submission_link: self.submission_link,
            notes: self.notes,
            reward_claimed: self.reward_claimed,
            approved_at: self.approved_at.map(to_chrono),
            created_at: to_rfc3339(self.created_at),
            updated_at: to_rfc3339(self.updated_at),
        })
    }
}
