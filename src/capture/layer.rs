//! Tracing layer that copies events into the current request capture.
//!
//! Install it next to the normal formatting layer: events keep flowing to
//! the process log, and those emitted inside a capture scope are also
//! appended to that request's buffer.

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::capture::buffer::{CaptureHandle, LogLevel};

/// `tracing_subscriber` layer feeding [`CaptureHandle`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaptureLayer;

impl CaptureLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(handle) = CaptureHandle::current() else {
            return;
        };

        let mut visitor = ArgsVisitor::default();
        event.record(&mut visitor);

        let mut args = Vec::with_capacity(visitor.fields.len() + 1);
        if let Some(message) = visitor.message {
            args.push(Value::String(message));
        }
        args.extend(visitor.fields.into_iter().map(Value::String));

        handle.record(LogLevel::from(event.metadata().level()), &args);
    }
}

#[derive(Default)]
struct ArgsVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl Visit for ArgsVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test]
    async fn test_events_land_in_scoped_capture() {
        let subscriber = tracing_subscriber::registry().with(CaptureLayer::new());
        let _guard = tracing::subscriber::set_default(subscriber);

        let handle = CaptureHandle::begin("GET", "/users/profile");
        handle
            .scope(async {
                tracing::info!(user_id = 7, "loaded profile");
                tracing::warn!("cache miss");
                tracing::debug!(name = "ann", "detail");
                tracing::error!("boom");
            })
            .await;
        tracing::info!("outside any request");

        let entries = handle.finish();
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.level, e.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                (LogLevel::Info, "loaded profile user_id=7"),
                (LogLevel::Warn, "cache miss"),
                (LogLevel::Log, "detail name=ann"),
                (LogLevel::Error, "boom"),
            ]
        );
    }
}
