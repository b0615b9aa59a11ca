//! Leaderboard and user stats models, read from the database views.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Row of `leaderboard_view`.
///
/// The view ranks users by points, breaking ties by signup time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    /// All bias reports filed by the user
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub reports_submitted: u64,
    /// Reports that were verified
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub bias_found: u64,
    /// 1-based position
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub rank: u64,
}

fn default_level() -> u32 {
    1
}

/// Per-user contribution counters from `user_stats_view`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStats {
    pub user_id: String,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub datasets_uploaded: u64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub reports_submitted: u64,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub bias_found: u64,
}

impl UserStats {
    /// Stats for a user with no row in the view.
    pub fn empty(user_id: String) -> Self {
        Self {
            user_id,
            points: 0,
            datasets_uploaded: 0,
            reports_submitted: 0,
            bias_found: 0,
        }
    }
}
