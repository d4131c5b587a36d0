//! Request-scoped log buffers.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

tokio::task_local! {
    static CURRENT: CaptureHandle;
}

/// Level of a captured entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Log,
    Warn,
    Error,
    Info,
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::INFO => LogLevel::Info,
            _ => LogLevel::Log,
        }
    }
}

/// One diagnostic emitted while a request was handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub method: String,
    pub endpoint: String,
    pub message: String,
}

struct Capture {
    method: String,
    endpoint: String,
    entries: Mutex<Vec<LogEntry>>,
}

/// The capture buffer of one request.
///
/// Cloning shares the buffer; it is never reachable from another request.
#[derive(Clone)]
pub struct CaptureHandle {
    inner: Arc<Capture>,
}

impl CaptureHandle {
    /// Start capturing for a request.
    pub fn begin(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Capture {
                method: method.into(),
                endpoint: endpoint.into(),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Append an entry built from `args`.
    pub fn record(&self, level: LogLevel, args: &[Value]) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            method: self.inner.method.clone(),
            endpoint: self.inner.endpoint.clone(),
            message: stringify(args),
        };
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Take everything captured so far, in emission order.
    pub fn finish(&self) -> Vec<LogEntry> {
        std::mem::take(
            &mut *self
                .inner
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Run `future` with this handle as the current capture.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT.scope(self.clone(), future).await
    }

    /// The capture of the request running on this task, if any.
    pub fn current() -> Option<CaptureHandle> {
        CURRENT.try_with(CaptureHandle::clone).ok()
    }
}

impl std::fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHandle")
            .field("method", &self.inner.method)
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

/// Record into the current request's capture. No-op outside a capture scope.
pub fn record(level: LogLevel, args: &[Value]) {
    if let Some(handle) = CaptureHandle::current() {
        handle.record(level, args);
    }
}

/// Join arguments with spaces: strings verbatim, everything else as JSON.
pub fn stringify(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
