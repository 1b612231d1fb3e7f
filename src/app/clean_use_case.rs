use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::{BatchSource, SubmissionSink};
use crate::error::Result;
use crate::normalize::{clean_batch, BatchReport, MissingIdPolicy};
use crate::types::{CanonicalRecord, SubmissionPayload, SubmissionReply, SubmitRequest};

/// The three operations exposed by the service: raw fetch, cleaned fetch and
/// submission. HTTP and CLI layers both drive this.
pub struct CleanUseCase {
    source: Arc<dyn BatchSource>,
    sink: Arc<dyn SubmissionSink>,
    candidate_name: String,
    policy: MissingIdPolicy,
}

impl CleanUseCase {
    pub fn new(
        source: Arc<dyn BatchSource>,
        sink: Arc<dyn SubmissionSink>,
        candidate_name: impl Into<String>,
        policy: MissingIdPolicy,
    ) -> Self {
        Self {
            source,
            sink,
            candidate_name: candidate_name.into(),
            policy,
        }
    }

    /// Raw payload for `batch`, or `None` when the fetch gave up
    pub async fn raw_batch(&self, batch: u32) -> Option<Value> {
        self.source.fetch(batch).await
    }

    /// Fetch `batch` and run it through normalization and deduplication
    pub async fn cleaned_batch(&self, batch: u32) -> Option<(Vec<CanonicalRecord>, BatchReport)> {
        let payload = self.source.fetch(batch).await?;
        if is_empty_payload(&payload) {
            warn!("Batch {} came back empty", batch);
            return None;
        }
        let (cleaned, report) = clean_batch(&payload, self.policy);
        info!(batch, kept = report.kept, "Cleaned batch ready");
        Some((cleaned, report))
    }

    /// Forward a cleaned batch, filling in the configured candidate name
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmissionReply> {
        let payload = SubmissionPayload {
            candidate_name: request
                .candidate_name
                .unwrap_or_else(|| self.candidate_name.clone()),
            batch_id: request.batch_id,
            cleaned_items: request.cleaned_items,
        };
        info!(
            batch_id = %payload.batch_id,
            items = ?payload.cleaned_items.as_array().map(Vec::len),
            "Submitting cleaned batch"
        );
        self.sink.submit(&payload).await
    }

    /// Submit records this crate cleaned itself under `batch`
    pub async fn submit_cleaned(
        &self,
        batch: u32,
        records: &[CanonicalRecord],
    ) -> Result<SubmissionReply> {
        self.submit(SubmitRequest {
            batch_id: Value::from(batch),
            cleaned_items: serde_json::to_value(records)?,
            candidate_name: None,
        })
        .await
    }
}

/// A payload carrying nothing at all is treated like a failed fetch
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
