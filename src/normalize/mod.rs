//! The normalization pipeline: alias resolution, date and amount coercion,
//! and batch deduplication.

pub mod aliases;
pub mod amount;
pub mod date;
pub mod dedupe;
pub mod record;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::RECORDS_KEY;
use crate::types::CanonicalRecord;

pub use amount::clean_amount;
pub use date::parse_expiry_date;
pub use dedupe::{remove_duplicates, remove_duplicates_with, MissingIdPolicy};
pub use record::normalize_record;

/// Counts from one pass over a raw batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Entries found under `records`
    pub received: usize,
    /// Entries that were not objects
    pub rejected: usize,
    /// Records dropped by deduplication
    pub duplicates: usize,
    pub kept: usize,
}

/// Normalize every entry of a raw batch payload and deduplicate the result.
///
/// The payload is expected to be an object with a `records` array. A missing
/// or non-array `records` is treated as an empty batch. Entries that are not
/// objects are dropped and counted in [`BatchReport::rejected`].
pub fn clean_batch(payload: &Value, policy: MissingIdPolicy) -> (Vec<CanonicalRecord>, BatchReport) {
    let entries: &[Value] = match payload.get(RECORDS_KEY) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            warn!("Batch payload has a non-array '{}' field; treating as empty", RECORDS_KEY);
            &[]
        }
        None => {
            warn!("Batch payload has no '{}' field; treating as empty", RECORDS_KEY);
            &[]
        }
    };
    let (cleaned, report) = clean_records(entries, policy);
    metrics_record(&report);
    (cleaned, report)
}

/// Same as [`clean_batch`] for an already extracted record list
pub fn clean_records(entries: &[Value], policy: MissingIdPolicy) -> (Vec<CanonicalRecord>, BatchReport) {
    let mut report = BatchReport {
        received: entries.len(),
        ..Default::default()
    };

    let mut normalized = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match normalize_record(entry) {
            Some(record) => normalized.push(record),
            None => {
                report.rejected += 1;
                warn!(index, "Rejected record that is not an object");
            }
        }
    }

    let before = normalized.len();
    let unique = remove_duplicates_with(normalized, policy);
    report.duplicates = before - unique.len();
    report.kept = unique.len();

    debug!(?policy, "Deduplicated {} records down to {}", before, report.kept);
    info!(
        received = report.received,
        rejected = report.rejected,
        duplicates = report.duplicates,
        kept = report.kept,
        "Batch cleaned"
    );
    (unique, report)
}

fn metrics_record(report: &BatchReport) {
    crate::metrics::normalize::batch_cleaned(
        report.received,
        report.rejected,
        report.duplicates,
        report.kept,
    );
}
