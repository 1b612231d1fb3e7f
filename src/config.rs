use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::*;
use crate::error::{CleanerError, Result};
use crate::normalize::MissingIdPolicy;

/// Process configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_api: String,
    pub candidate_id: String,
    pub candidate_name: String,
    pub fetch: FetchConfig,
    pub server: ServerConfig,
    pub dedupe_missing_ids: MissingIdPolicy,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Total attempts, including the first
    pub retries: u32,
    /// Delay after the first failed attempt; doubles each time
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_FETCH_RETRIES,
            backoff: Duration::from_millis(DEFAULT_FETCH_BACKOFF_MS),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics_port: None,
        }
    }
}

/// Optional TOML overlay. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    base_api: Option<String>,
    candidate_id: Option<String>,
    candidate_name: Option<String>,
    dedupe_missing_ids: Option<MissingIdPolicy>,
    debug: Option<bool>,
    fetch: FileFetchConfig,
    server: FileServerConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileFetchConfig {
    retries: Option<u32>,
    backoff_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileServerConfig {
    port: Option<u16>,
    metrics_port: Option<u16>,
}

impl Config {
    /// Load `.env`, the optional TOML file, then the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let file = match config_path {
            Some(path) => Some(Self::read_file(path)?),
            None => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    fn read_file(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Layer defaults, TOML text and an environment lookup (later wins).
    pub fn from_sources<F>(toml_text: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => FileConfig::default(),
        };
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let base_api = env(ENV_BASE_API)
            .or_else(|| env(ENV_BASE_API_LEGACY))
            .or(file.base_api)
            .unwrap_or_else(|| DEFAULT_BASE_API.to_string())
            .trim_end_matches('/')
            .to_string();

        let candidate_id = env(ENV_CANDIDATE_ID)
            .or(file.candidate_id)
            .ok_or_else(|| {
                CleanerError::Config(format!(
                    "Missing required environment variable: {}",
                    ENV_CANDIDATE_ID
                ))
            })?;

        let candidate_name = env(ENV_CANDIDATE_NAME)
            .or(file.candidate_name)
            .unwrap_or_else(|| DEFAULT_CANDIDATE_NAME.to_string());

        let retries = parse_env(&env, ENV_FETCH_RETRIES)?
            .or(file.fetch.retries)
            .unwrap_or(DEFAULT_FETCH_RETRIES);
        if retries == 0 {
            return Err(CleanerError::Config(format!(
                "{} must be at least 1",
                ENV_FETCH_RETRIES
            )));
        }
        let backoff_ms = parse_env(&env, ENV_FETCH_BACKOFF_MS)?
            .or(file.fetch.backoff_ms)
            .unwrap_or(DEFAULT_FETCH_BACKOFF_MS);
        let timeout_secs = parse_env(&env, ENV_FETCH_TIMEOUT_SECS)?
            .or(file.fetch.timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        let port = parse_env(&env, ENV_PORT)?
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);
        let metrics_port = parse_env(&env, ENV_METRICS_PORT)?.or(file.server.metrics_port);

        let dedupe_missing_ids = parse_env(&env, ENV_DEDUPE_MISSING_IDS)?
            .or(file.dedupe_missing_ids)
            .unwrap_or_default();

        let debug = env(ENV_DEBUG)
            .map(|v| v == "True" || v.eq_ignore_ascii_case("true") || v == "1")
            .or(file.debug)
            .unwrap_or(false);

        Ok(Self {
            base_api,
            candidate_id,
            candidate_name,
            fetch: FetchConfig {
                retries,
                backoff: Duration::from_millis(backoff_ms),
                timeout: Duration::from_secs(timeout_secs),
            },
            server: ServerConfig { port, metrics_port },
            dedupe_missing_ids,
            debug,
        })
    }

    pub fn data_url(&self) -> String {
        format!("{}{}", self.base_api, DATA_PATH)
    }

    pub fn submit_url(&self) -> String {
        format!("{}{}", self.base_api, SUBMIT_PATH)
    }
}

fn parse_env<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CleanerError::Config(format!("Invalid value for {}: '{}' ({})", key, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_candidate_id_fails_fast() {
        let err = Config::from_sources(None, lookup(&[])).unwrap_err();
        assert!(matches!(err, CleanerError::Config(msg) if msg.contains("CANDIDATE_ID")));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_sources(None, lookup(&[("CANDIDATE_ID", "cand-1")])).unwrap();
        assert_eq!(config.base_api, DEFAULT_BASE_API);
        assert_eq!(config.candidate_name, DEFAULT_CANDIDATE_NAME);
        assert_eq!(config.fetch, FetchConfig::default());
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.dedupe_missing_ids, MissingIdPolicy::Collapse);
        assert!(!config.debug);
        assert_eq!(
            config.data_url(),
            "https://fast-endpoint-production.up.railway.app/api/data"
        );
    }

    #[test]
    fn legacy_base_api_is_honoured() {
        let config = Config::from_sources(
            None,
            lookup(&[("CANDIDATE_ID", "c"), ("LUMICORE_API", "http://legacy:9000/")]),
        )
        .unwrap();
        assert_eq!(config.submit_url(), "http://legacy:9000/api/submit");
    }

    #[test]
    fn env_overrides_file() {
        let toml_text = r#"
            candidate_id = "from-file"
            dedupe_missing_ids = "keep_all"

            [fetch]
            retries = 5
            backoff_ms = 10

            [server]
            port = 9100
        "#;
        let config = Config::from_sources(
            Some(toml_text),
            lookup(&[("FETCH_RETRIES", "2"), ("DEBUG", "True")]),
        )
        .unwrap();
        assert_eq!(config.candidate_id, "from-file");
        assert_eq!(config.fetch.retries, 2);
        assert_eq!(config.fetch.backoff, Duration::from_millis(10));
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.dedupe_missing_ids, MissingIdPolicy::KeepAll);
        assert!(config.debug);
    }

    #[test]
    fn file_and_env_accept_the_same_policy_names() {
        let env = lookup(&[("CANDIDATE_ID", "c")]);
        for name in ["keep", "keep_all"] {
            let toml_text = format!("dedupe_missing_ids = \"{}\"", name);
            let from_file = Config::from_sources(Some(toml_text.as_str()), &env).unwrap();
            assert_eq!(from_file.dedupe_missing_ids, MissingIdPolicy::KeepAll);

            let from_env = Config::from_sources(
                None,
                lookup(&[("CANDIDATE_ID", "c"), ("DEDUPE_MISSING_IDS", name)]),
            )
            .unwrap();
            assert_eq!(from_env.dedupe_missing_ids, MissingIdPolicy::KeepAll);
        }
    }

    #[test]
    fn bad_numbers_and_policies_are_rejected() {
        let bad_retries = Config::from_sources(
            None,
            lookup(&[("CANDIDATE_ID", "c"), ("FETCH_RETRIES", "many")]),
        );
        assert!(bad_retries.is_err());

        let zero_retries =
            Config::from_sources(None, lookup(&[("CANDIDATE_ID", "c"), ("FETCH_RETRIES", "0")]));
        assert!(zero_retries.is_err());

        let bad_policy = Config::from_sources(
            None,
            lookup(&[("CANDIDATE_ID", "c"), ("DEDUPE_MISSING_IDS", "maybe")]),
        );
        assert!(bad_policy.is_err());
    }

    #[test]
    fn reads_toml_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "candidate_id = \"disk\"\n[server]\nmetrics_port = 9464").unwrap();
        let text = Config::read_file(file.path()).unwrap();
        let config = Config::from_sources(Some(text.as_str()), lookup(&[])).unwrap();
        assert_eq!(config.candidate_id, "disk");
        assert_eq!(config.server.metrics_port, Some(9464));
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = Config::read_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }
}
