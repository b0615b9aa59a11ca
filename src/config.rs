//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::time::Duration;

/// Default upload-analysis timeout. First-time model loading on the bias
/// service can take several minutes.
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 600;

/// Local marketplace database used when `MONGODB_URI` is unset.
const DEFAULT_MONGODB_URI: &str = "mongodb://127.0.0.1:27017/hackspire";

/// Default maximum multipart upload size (100 MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL (CORS origin)
    pub frontend_url: String,
    /// Base URL of the bias detection service, without trailing slash
    pub bias_api_url: String,
    /// Upper bound on a single upload-analysis exchange
    pub analysis_timeout: Duration,
    /// Maximum accepted request body for uploads
    pub max_upload_bytes: usize,
    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase API key (service role preferred)
    pub supabase_key: String,
    /// Base URL of the wallet (Aptos) backend
    pub aptos_api_url: String,
    /// MongoDB connection string for the marketplace
    pub mongodb_uri: String,
}

impl Config {
    /// Config for tests: every upstream points at an unroutable local port.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            bias_api_url: "http://127.0.0.1:9".to_string(),
            analysis_timeout: Duration::from_secs(5),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            supabase_url: "http://127.0.0.1:9".to_string(),
            supabase_key: "test_supabase_key".to_string(),
            aptos_api_url: "http://127.0.0.1:9".to_string(),
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            bias_api_url: trim_base_url(
                env::var("BIAS_DETECTION_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            ),
            analysis_timeout: Duration::from_secs(parse_or(
                "ANALYSIS_TIMEOUT_SECS",
                DEFAULT_ANALYSIS_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            supabase_url: trim_base_url(
                first_var(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"])
                    .ok_or(ConfigError::Missing("SUPABASE_URL"))?,
            ),
            supabase_key: first_var(&["SUPABASE_SERVICE_ROLE_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"])
                .map(|v| v.trim().to_string())
                .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            aptos_api_url: trim_base_url(
                env::var("APTOS_API_URL")
                    .unwrap_or_else(|_| "https://api.rwinsight.site".to_string()),
            ),
            mongodb_uri: first_var(&["MONGODB_URI"])
                .unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
        })
    }
}

/// First non-empty value among the given variable names.
fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
