//! Response body wrapper that reports when the response is complete.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::{Body, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};

use crate::capture::CaptureHandle;
use crate::observability::metrics;
use crate::report::{TraceRecord, TraceReporter};

/// Everything needed to build the trace once the body is done.
pub struct PendingTrace {
    pub capture: CaptureHandle,
    pub reporter: TraceReporter,
    pub method: String,
    pub endpoint: String,
    pub status: u16,
    pub started: Instant,
}

impl PendingTrace {
    fn complete(self) {
        let elapsed = self.started.elapsed();
        metrics::record_duration(self.started);

        let record = TraceRecord::new(
            self.method,
            self.endpoint,
            self.status,
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            self.capture.finish(),
        );
        self.reporter.send(record);
    }
}

/// Passes the inner body through and fires the pending trace exactly once:
/// at end of stream, on a body error, or when dropped unfinished.
pub struct TracedBody {
    inner: Body,
    pending: Option<PendingTrace>,
}

impl TracedBody {
    pub fn new(inner: Body, pending: PendingTrace) -> Self {
        Self {
            inner,
            pending: Some(pending),
        }
    }

    fn complete(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.complete();
        }
    }
}

impl HttpBody for TracedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if matches!(polled, Poll::Ready(None) | Poll::Ready(Some(Err(_)))) {
            this.complete();
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for TracedBody {
    fn drop(&mut self) {
        self.complete();
    }
}
