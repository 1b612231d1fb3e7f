//! Environment variable names and built-in defaults shared by the config layer,
//! the HTTP gateway and the CLI.

// Environment variables
pub const ENV_BASE_API: &str = "BASE_API";
pub const ENV_BASE_API_LEGACY: &str = "LUMICORE_API";
pub const ENV_CANDIDATE_ID: &str = "CANDIDATE_ID";
pub const ENV_CANDIDATE_NAME: &str = "CANDIDATE_NAME";
pub const ENV_FETCH_RETRIES: &str = "FETCH_RETRIES";
pub const ENV_FETCH_BACKOFF_MS: &str = "FETCH_BACKOFF_MS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_PORT: &str = "PORT";
pub const ENV_METRICS_PORT: &str = "METRICS_PORT";
pub const ENV_DEDUPE_MISSING_IDS: &str = "DEDUPE_MISSING_IDS";
pub const ENV_DEBUG: &str = "DEBUG";

// Defaults
pub const DEFAULT_BASE_API: &str = "https://fast-endpoint-production.up.railway.app";
pub const DEFAULT_CANDIDATE_NAME: &str = "Mohammed Anas";
pub const DEFAULT_FETCH_RETRIES: u32 = 3;
pub const DEFAULT_FETCH_BACKOFF_MS: u64 = 500;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PORT: u16 = 8000;

// Remote API surface
pub const CANDIDATE_HEADER: &str = "X-Candidate-Id";
pub const DATA_PATH: &str = "/api/data";
pub const SUBMIT_PATH: &str = "/api/submit";

/// Key holding the record list inside a raw batch payload
pub const RECORDS_KEY: &str = "records";

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";
