use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed six-field shape every raw record is normalized into.
///
/// All fields are serialized, so a missing value shows up as `null` rather
/// than being dropped from the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    /// Always `YYYY-MM-DD` when present
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub amount: Option<u64>,
}

/// Body posted to the remote submission endpoint.
///
/// `batch_id` and `cleaned_items` are whatever the caller sent; the remote
/// side is the one that validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub candidate_name: String,
    pub batch_id: Value,
    pub cleaned_items: Value,
}

/// Body accepted by the local `/submit` route. Missing fields become `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub batch_id: Value,
    #[serde(default)]
    pub cleaned_items: Value,
    #[serde(default)]
    pub candidate_name: Option<String>,
}

/// What the submission endpoint answered, relayed as-is
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReply {
    pub status: u16,
    pub body: Value,
}
