use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{SubmissionPayload, SubmissionReply};

/// Where raw batches come from
#[async_trait]
pub trait BatchSource: Send + Sync {
    /// Fetch one raw batch payload. `None` means every attempt failed.
    async fn fetch(&self, batch: u32) -> Option<Value>;
}

/// Where cleaned batches are sent
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Post a cleaned batch. Downstream error statuses come back as `Ok`;
    /// only transport problems are `Err`.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReply>;
}
