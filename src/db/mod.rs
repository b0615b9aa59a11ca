//! Database layer: Supabase (PostgREST) for datasets and rankings, MongoDB
//! for the marketplace.

pub mod marketplace;
pub mod mongo;
pub mod supabase;

pub use marketplace::MarketplaceStore;
pub use mongo::MongoMarketplace;
pub use supabase::SupabaseDb;

/// Supabase table and view names.
pub mod tables {
    pub const DATASETS: &str = "datasets";
    /// Users ranked by points with report counters
    pub const LEADERBOARD_VIEW: &str = "leaderboard_view";
    /// Per-user dataset and report counters
    pub const USER_STATS_VIEW: &str = "user_stats_view";
}

/// MongoDB collection names.
pub mod collections {
    pub const FILES: &str = "files";
    pub const SUBMISSIONS: &str = "submissions";
}
