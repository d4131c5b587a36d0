//! Trace delivery to the remote collector.
//!
//! # Responsibilities
//! - `POST /logs` one trace record
//! - Run delivery off the response path
//! - Log, never propagate, delivery failures

use reqwest::StatusCode;
use thiserror::Error;

use crate::observability::metrics;
use crate::remote::Remote;
use crate::report::record::TraceRecord;

/// Failures delivering a trace.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("trace service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("trace service responded with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Ships trace records to the collector.
#[derive(Clone, Debug)]
pub struct TraceReporter {
    remote: Remote,
}

impl TraceReporter {
    pub fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// Deliver `record` on a background task and return immediately.
    pub fn send(&self, record: TraceRecord) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(trace_id = %record.trace_id, "No runtime available, trace dropped");
            metrics::record_trace_delivery("dropped");
            return;
        };

        let reporter = self.clone();
        runtime.spawn(async move {
            let trace_id = record.trace_id.clone();
            match reporter.deliver(&record).await {
                Ok(()) => {
                    tracing::info!(trace_id = %trace_id, "Trace sent to tracer service");
                    metrics::record_trace_delivery("sent");
                }
                Err(e) => {
                    tracing::error!(trace_id = %trace_id, error = %e, "Failed to send trace");
                    metrics::record_trace_delivery("failed");
                }
            }
        });
    }

    /// Deliver `record` and wait for the collector's answer. No retries.
    pub async fn deliver(&self, record: &TraceRecord) -> Result<(), ReportError> {
        let response = self
            .remote
            .http
            .post(self.remote.url("/logs"))
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReportError::Rejected { status, body })
    }
}
