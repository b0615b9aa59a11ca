// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod dataset;
pub mod marketplace;
pub mod user;
pub mod wallet;

pub use dataset::{Dataset, DatasetStatus, NewDataset};
pub use marketplace::{FileDoc, NewFile, NewSubmission, Submission, SubmissionStatus};
pub use user::{LeaderboardEntry, UserStats};

/// Current time as RFC3339 with a `Z` suffix, used for record timestamps.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
