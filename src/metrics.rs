//! Counter catalogue for the cleaning service.
//!
//! Counters are recorded through the `metrics` facade and are no-ops until
//! [`init`] installs the Prometheus exporter.

use std::fmt;
use std::net::SocketAddr;

use tracing::{info, warn};

/// Every metric the service emits. Keeps names out of call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Fetch gateway
    FetchAttempts,
    FetchAttemptFailures,
    FetchExhausted,

    // Normalization pipeline
    RecordsNormalized,
    RecordsRejected,
    DuplicatesDropped,
    BatchesCleaned,
    BatchSize,

    // Submission
    SubmissionsSent,
    SubmissionErrors,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchAttempts => "cleaner_fetch_attempts_total",
            MetricName::FetchAttemptFailures => "cleaner_fetch_attempt_failures_total",
            MetricName::FetchExhausted => "cleaner_fetch_exhausted_total",
            MetricName::RecordsNormalized => "cleaner_records_normalized_total",
            MetricName::RecordsRejected => "cleaner_records_rejected_total",
            MetricName::DuplicatesDropped => "cleaner_duplicates_dropped_total",
            MetricName::BatchesCleaned => "cleaner_batches_cleaned_total",
            MetricName::BatchSize => "cleaner_batch_size",
            MetricName::SubmissionsSent => "cleaner_submissions_sent_total",
            MetricName::SubmissionErrors => "cleaner_submission_errors_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            FetchAttempts,
            FetchAttemptFailures,
            FetchExhausted,
            RecordsNormalized,
            RecordsRejected,
            DuplicatesDropped,
            BatchesCleaned,
            BatchSize,
            SubmissionsSent,
            SubmissionErrors,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus exporter on `0.0.0.0:port`. Without a port the
/// facade stays unbound and every counter is dropped.
pub fn init(port: Option<u16>) {
    let Some(port) = port else {
        info!("Metrics exporter disabled (no metrics port configured)");
        return;
    };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
        Err(e) => warn!("Prometheus exporter install failed (possibly already installed): {}", e),
    }
}

pub mod fetch {
    use super::MetricName;

    pub fn attempt() {
        ::metrics::counter!(MetricName::FetchAttempts.as_str()).increment(1);
    }

    pub fn attempt_failed() {
        ::metrics::counter!(MetricName::FetchAttemptFailures.as_str()).increment(1);
    }

    /// All retries used up without a payload
    pub fn exhausted() {
        ::metrics::counter!(MetricName::FetchExhausted.as_str()).increment(1);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn batch_cleaned(received: usize, rejected: usize, duplicates: usize, kept: usize) {
        ::metrics::counter!(MetricName::BatchesCleaned.as_str()).increment(1);
        ::metrics::histogram!(MetricName::BatchSize.as_str()).record(received as f64);
        ::metrics::counter!(MetricName::RecordsNormalized.as_str()).increment(kept as u64);
        ::metrics::counter!(MetricName::RecordsRejected.as_str()).increment(rejected as u64);
        ::metrics::counter!(MetricName::DuplicatesDropped.as_str()).increment(duplicates as u64);
    }
}

pub mod submit {
    use super::MetricName;

    pub fn sent() {
        ::metrics::counter!(MetricName::SubmissionsSent.as_str()).increment(1);
    }

    pub fn error() {
        ::metrics::counter!(MetricName::SubmissionErrors.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn metric_names_are_unique_and_prefixed() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
        assert!(names.iter().all(|n| n.starts_with("cleaner_")));
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(MetricName::FetchExhausted.to_string(), "cleaner_fetch_exhausted_total");
    }

    #[test]
    fn counters_without_recorder_are_noops() {
        fetch::attempt();
        normalize::batch_cleaned(3, 1, 1, 1);
        submit::error();
    }
}
