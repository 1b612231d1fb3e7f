use crate::app::ports::{BatchSource, SubmissionSink};
use crate::config::{Config, FetchConfig};
use crate::constants::CANDIDATE_HEADER;
use crate::error::{CleanerError, Result};
use crate::types::{SubmissionPayload, SubmissionReply};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// reqwest-backed client for the remote document API: batch fetch with
/// retry/backoff, and submission.
pub struct ReqwestGateway {
    client: reqwest::Client,
    data_url: String,
    submit_url: String,
    candidate_id: String,
    fetch: FetchConfig,
}

impl ReqwestGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch.timeout)
            .build()?;
        Ok(Self {
            client,
            data_url: config.data_url(),
            submit_url: config.submit_url(),
            candidate_id: config.candidate_id.clone(),
            fetch: config.fetch.clone(),
        })
    }

    /// Delay before retrying after the failed attempt `attempt` (0-based)
    pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
        base.saturating_mul(2u32.saturating_pow(attempt))
    }

    async fn attempt_fetch(&self, batch: u32) -> std::result::Result<Value, String> {
        let resp = self
            .client
            .get(&self.data_url)
            .query(&[("batch", batch)])
            .header(CANDIDATE_HEADER, &self.candidate_id)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(format!("unexpected status {}", status.as_u16()));
        }
        resp.json::<Value>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl BatchSource for ReqwestGateway {
    #[instrument(skip(self))]
    async fn fetch(&self, batch: u32) -> Option<Value> {
        let attempts = self.fetch.retries;
        for attempt in 0..attempts {
            crate::metrics::fetch::attempt();
            match self.attempt_fetch(batch).await {
                Ok(payload) => {
                    debug!("Fetched batch {} on attempt {}", batch, attempt + 1);
                    return Some(payload);
                }
                Err(e) => {
                    crate::metrics::fetch::attempt_failed();
                    warn!("Fetch attempt {}/{} for batch {} failed: {}", attempt + 1, attempts, batch, e);
                }
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(Self::backoff_delay(self.fetch.backoff, attempt)).await;
            }
        }
        crate::metrics::fetch::exhausted();
        warn!("Giving up on batch {} after {} attempts", batch, attempts);
        None
    }
}

#[async_trait]
impl SubmissionSink for ReqwestGateway {
    #[instrument(skip(self, payload))]
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReply> {
        let resp = self
            .client
            .post(&self.submit_url)
            .header(CANDIDATE_HEADER, &self.candidate_id)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                crate::metrics::submit::error();
                CleanerError::Submission { message: e.to_string() }
            })?;
        let status = resp.status().as_u16();
        let body = resp.json::<Value>().await.map_err(|e| {
            crate::metrics::submit::error();
            CleanerError::Submission {
                message: format!("submission endpoint returned status {} with a non-JSON body: {}", status, e),
            }
        })?;
        crate::metrics::submit::sent();
        info!("Submission answered with status {}", status);
        Ok(SubmissionReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(ReqwestGateway::backoff_delay(base, 0), Duration::from_millis(500));
        assert_eq!(ReqwestGateway::backoff_delay(base, 1), Duration::from_millis(1000));
        assert_eq!(ReqwestGateway::backoff_delay(base, 2), Duration::from_millis(2000));
    }

    #[test]
    fn backoff_saturates() {
        let delay = ReqwestGateway::backoff_delay(Duration::from_secs(1), 64);
        assert_eq!(delay, Duration::from_secs(1).saturating_mul(u32::MAX));
    }
}
