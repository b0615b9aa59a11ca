// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage interface for marketplace files and submissions.

use crate::error::AppError;
use crate::models::marketplace::SubmissionPatch;
use crate::models::{FileDoc, NewFile, NewSubmission, Submission};
use async_trait::async_trait;

/// Marketplace persistence used by the marketplace routes.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Store file metadata, stamping `createdAt`/`updatedAt`.
    async fn insert_file(&self, file: &NewFile) -> Result<FileDoc, AppError>;

    /// Most recently posted files, newest first.
    async fn recent_files(&self, limit: u32) -> Result<Vec<FileDoc>, AppError>;

    /// Store a new submission, stamping `createdAt`/`updatedAt`.
    async fn insert_submission(&self, submission: &NewSubmission)
        -> Result<Submission, AppError>;

    /// Apply a partial update and bump `updatedAt`. `None` when no
    /// submission has this ID.
    async fn update_submission(
        &self,
        submission_id: &str,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>, AppError>;

    /// Submissions made by a worker, newest first.
    async fn submissions_by_worker(&self, worker_id: &str) -> Result<Vec<Submission>, AppError>;

    /// Submissions against a client's files, newest first.
    async fn submissions_by_client(&self, client_id: &str) -> Result<Vec<Submission>, AppError>;
}
